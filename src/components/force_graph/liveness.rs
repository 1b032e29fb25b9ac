use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag telling asynchronous continuations whether their view still exists.
///
/// Clones share the flag. Once revoked it never becomes live again.
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Default for Liveness {
	fn default() -> Self {
		Self::new()
	}
}

impl Liveness {
	pub fn new() -> Self {
		Self(Arc::new(AtomicBool::new(true)))
	}

	pub fn is_live(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}

	pub fn revoke(&self) {
		self.0.store(false, Ordering::Release);
	}
}

/// Keeps a host callback registered for as long as the guard lives.
///
/// Dropping the guard runs `detach` first and only then drops the callback,
/// so the host never holds a reference to a freed callback.
pub struct ListenerGuard<C> {
	callback: C,
	detach: Option<Box<dyn FnOnce(&C)>>,
}

impl<C> ListenerGuard<C> {
	pub fn new(callback: C, detach: impl FnOnce(&C) + 'static) -> Self {
		Self {
			callback,
			detach: Some(Box::new(detach)),
		}
	}
}

impl<C> Drop for ListenerGuard<C> {
	fn drop(&mut self) {
		if let Some(detach) = self.detach.take() {
			detach(&self.callback);
		}
	}
}
