//! Free list of reusable resolvers

use log::debug;
use std::path::Path;
use std::sync::Arc;

use super::SymbolNameAllocator;
use crate::domain::Pid;
use crate::symbolization::{CustomSymbolResolver, ResolverConfig};

/// Recycles [`CustomSymbolResolver`]s across profiled processes
///
/// Process lifecycle is tracked by the caller: [`acquire`](Self::acquire)
/// when a process shows up, [`release`](Self::release) once it has exited.
pub struct ResolverPool {
    config: ResolverConfig,
    allocator: Arc<SymbolNameAllocator>,
    free: Vec<CustomSymbolResolver>,
}

impl ResolverPool {
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config, allocator: Arc::new(SymbolNameAllocator::new()), free: Vec::new() }
    }

    /// Name allocator shared by every resolver from this pool
    #[must_use]
    pub fn allocator(&self) -> &Arc<SymbolNameAllocator> {
        &self.allocator
    }

    /// Take a resolver bound to `pid`, reusing a released one when available
    pub fn acquire(&mut self, pid: Pid, context: Arc<Path>) -> CustomSymbolResolver {
        let mut resolver = self
            .free
            .pop()
            .unwrap_or_else(|| CustomSymbolResolver::new(self.config.clone()));
        resolver.reset(pid, context, Arc::clone(&self.allocator));
        resolver
    }

    /// Clean up after a finished process and keep the resolver for reuse
    ///
    /// This deletes the process's map file if the resolver ever scanned it.
    pub fn release(&mut self, mut resolver: CustomSymbolResolver) {
        let pid = resolver.pid();
        resolver.free_resources();
        let purged = self.allocator.purge();
        debug!("Released resolver for {pid}, {purged} unused names dropped");
        self.free.push(resolver);
    }

    /// Resolvers waiting on the free list
    #[must_use]
    pub fn idle(&self) -> usize {
        self.free.len()
    }
}

impl Default for ResolverPool {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}
