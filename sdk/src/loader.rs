use std::sync::Arc;

use crate::error::LoadResult;
use crate::value::Value;

/// A backing store able to produce a whole namespace on demand.
///
/// `Ok(None)` means the namespace is not served by this loader and the
/// next loader in the chain should be asked. Any `Ok(Some(_))`, an empty
/// map included, is a result the store caches. `Err` is reserved for the
/// backing store itself failing.
pub trait Loader: Send + Sync {
    fn name(&self) -> &str;

    fn load(&self, namespace: &str) -> LoadResult<Option<Value>>;
}

impl<L: Loader + ?Sized> Loader for Box<L> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load(&self, namespace: &str) -> LoadResult<Option<Value>> {
        (**self).load(namespace)
    }
}

impl<L: Loader + ?Sized> Loader for Arc<L> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load(&self, namespace: &str) -> LoadResult<Option<Value>> {
        (**self).load(namespace)
    }
}
