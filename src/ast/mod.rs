pub mod sql_text;
pub use sql_text::*;

pub mod literal;
pub use literal::*;

pub mod operators;
pub use operators::*;

pub mod column;
pub use column::*;

pub mod function;
pub use function::*;

pub mod scalar_expr;
pub use scalar_expr::*;

pub mod identifier;
pub use identifier::*;

pub mod predicate;
pub use predicate::*;

pub mod order_by;
pub use order_by::*;

pub mod collection;
pub use collection::*;

pub mod join;
pub use join::*;

pub mod cte;
pub use cte::*;

pub mod select;
pub use select::*;

pub mod query;
pub use query::*;

pub mod visit;
