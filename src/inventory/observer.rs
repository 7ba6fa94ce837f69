/// Handle returned by [`Observers::subscribe`], used to unsubscribe again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&[u32])>;

/// Ordered list of callbacks interested in which slots changed.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    pub fn subscribe(&mut self, callback: impl FnMut(&[u32]) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns false if nothing was subscribed under this id.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(other, _)| *other != id);
        self.callbacks.len() != before
    }

    /// Calls every subscriber in subscription order.
    pub fn notify(&mut self, changed: &[u32]) {
        for (_, callback) in &mut self.callbacks {
            callback(changed);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn notifies_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::default();

        let first = log.clone();
        observers.subscribe(move |changed| first.borrow_mut().push(("first", changed.to_vec())));
        let second = log.clone();
        observers.subscribe(move |changed| second.borrow_mut().push(("second", changed.to_vec())));

        observers.notify(&[3, 1]);
        assert_eq!(
            *log.borrow(),
            vec![("first", vec![3, 1]), ("second", vec![3, 1])]
        );
    }

    #[test]
    fn unsubscribe_by_handle() {
        let calls = Rc::new(RefCell::new(0));
        let mut observers = Observers::default();

        let counter = calls.clone();
        let id = observers.subscribe(move |_| *counter.borrow_mut() += 1);
        let counter = calls.clone();
        observers.subscribe(move |_| *counter.borrow_mut() += 10);

        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));

        observers.notify(&[0]);
        assert_eq!(*calls.borrow(), 10);
    }
}
