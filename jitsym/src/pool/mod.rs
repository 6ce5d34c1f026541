//! Object pools shared across resolvers
//!
//! A profiler watches many short-lived processes. Rather than building a
//! resolver per process and letting names be duplicated per resolver, two
//! pools are kept:
//!
//! - [`SymbolNameAllocator`]: hands out one `Arc<SymbolName>` per distinct
//!   (context, name) pair, shared by every resolver that publishes it
//! - [`ResolverPool`]: free list of [`CustomSymbolResolver`]s that are reset
//!   for each new process and cleaned up when it goes away
//!
//! [`CustomSymbolResolver`]: crate::symbolization::CustomSymbolResolver

pub mod allocator;
pub mod resolver_pool;

pub use allocator::SymbolNameAllocator;
pub use resolver_pool::ResolverPool;
