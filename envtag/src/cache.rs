//! Read-through cache of decoded configuration, one value per type

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, PoisonError, RwLock};

use crate::de::Unmarshal;
use crate::error::Error;

static CACHE: LazyLock<RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>> =
    LazyLock::new(Default::default);

// One lock per type, so concurrent callers never decode the same type twice
// while loads of different types, including nested ones, stay independent.
static LOADING: LazyLock<Mutex<HashMap<TypeId, Arc<Mutex<()>>>>> =
    LazyLock::new(Default::default);

fn load_lock<T: 'static>() -> Arc<Mutex<()>> {
    LOADING
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(TypeId::of::<T>())
        .or_default()
        .clone()
}

fn cached<T: Clone + 'static>() -> Option<T> {
    CACHE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&TypeId::of::<T>())?
        .downcast_ref::<T>()
        .cloned()
}

/// Load `T` from the process environment once and return clones of it afterwards.
///
/// Failed loads are not cached; the next call tries again.
///
/// Hooks that run while `T` is decoding may call `get` for other types. Calling
/// `get::<T>()` from inside the decoding of `T` itself deadlocks.
///
/// # Errors
///
/// Same as [`crate::load`].
pub fn get<T>() -> Result<T, Error>
where
    T: Unmarshal + Default + Clone + Send + Sync,
{
    if let Some(value) = cached::<T>() {
        return Ok(value);
    }

    let lock = load_lock::<T>();
    let _loading = lock.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(value) = cached::<T>() {
        return Ok(value);
    }

    let value = crate::load::<T>()?;
    tracing::debug!(type_name = type_name::<T>(), "cached configuration");
    CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(TypeId::of::<T>(), Box::new(value.clone()));
    Ok(value)
}

/// Drop the cached value of `T`, so the next [`get`] loads it again.
pub fn forget<T: 'static>() -> bool {
    CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&TypeId::of::<T>())
        .is_some()
}
