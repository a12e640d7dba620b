//! Category handlers. Each one turns a routed utterance into the final
//! user-facing Korean response text; the router owns context updates and
//! chat logging.

pub mod faq;
pub mod price;
pub mod product_check;
pub mod product_list;
pub mod search;
