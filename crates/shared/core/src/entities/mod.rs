mod order;
mod side;

pub use order::{Order, OrderRequest};
pub use side::Side;
