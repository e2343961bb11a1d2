//! Application services of the task client: wire-to-domain assembly, the
//! entity cache, result paging and the gateway facade.

mod assembler;
mod cache;
mod error;
mod gateway;
mod pager;
mod request;

pub use assembler::EntityAssembler;
pub use cache::EntityCache;
pub use error::{TaskGatewayError, TaskGatewayResult};
pub use gateway::TaskGateway;
pub use pager::{LoadedPage, PageLoader, PageSource, TaskPager};
pub use request::{CreateTaskRequest, FetchOptions};
