use std::fmt;
use tokio::sync::watch;

/// A single published value that any number of observers can follow.
///
/// Publishing never blocks and works from any task, whether or not anyone
/// is subscribed. Observers see the latest value; intermediate values may be
/// skipped if several are published between two reads.
pub struct Observable<T> {
    sender: watch::Sender<T>,
}

impl<T: Clone> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    pub fn publish(&self, value: T) {
        self.sender.send_replace(value);
    }

    /// Modify the current value in place and notify observers.
    pub fn update<F>(&self, modify: F)
    where
        F: FnOnce(&mut T),
    {
        self.sender.send_modify(modify);
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observable").field(&*self.sender.borrow()).finish()
    }
}
