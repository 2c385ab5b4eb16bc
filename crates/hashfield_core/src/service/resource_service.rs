//! Resource use-case service.
//!
//! # Responsibility
//! - Provide register/rename/lookup entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or hash recomputation.

use crate::model::resource::{Resource, ResourceId};
use crate::repo::resource_repo::{RepoError, RepoResult, ResourceRepository};

/// Use-case service wrapper for resource operations.
pub struct ResourceService<R: ResourceRepository> {
    repo: R,
}

impl<R: ResourceRepository> ResourceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores a new resource for `url` and returns it with its hash set.
    pub fn register(&self, url: impl Into<String>) -> RepoResult<Resource> {
        let mut resource = Resource::new(url);
        self.repo.create_resource(&mut resource)?;
        Ok(resource)
    }

    /// Returns the resource stored for `url`, registering it when absent.
    pub fn get_or_register(&self, url: &str) -> RepoResult<Resource> {
        match self.repo.find_by_url(url)? {
            Some(resource) => Ok(resource),
            None => self.register(url),
        }
    }

    /// Replaces the URL of an existing resource.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when `id` is unknown.
    pub fn rename(&self, id: ResourceId, url: impl Into<String>) -> RepoResult<Resource> {
        let mut resource = self.repo.get_resource(id)?.ok_or(RepoError::NotFound(id))?;
        resource.url = url.into();
        self.repo.update_resource(&mut resource)?;
        Ok(resource)
    }

    pub fn get(&self, id: ResourceId) -> RepoResult<Option<Resource>> {
        self.repo.get_resource(id)
    }

    /// Exact-match lookup by URL through the hash index.
    pub fn lookup(&self, url: &str) -> RepoResult<Option<Resource>> {
        self.repo.find_by_url(url)
    }
}
