//! # Cola Circular Acotada
//! src/workers/queue.rs
//!
//! Buffer circular de capacidad fija. No es thread-safe por sí mismo: el pool
//! lo guarda dentro de su único `Mutex` junto con el flag de shutdown.
//!
//! ```text
//!   head            tail
//!    ↓               ↓
//! [ j3 | j4 | j5 | -- | -- | j1 | j2 ]   (head/tail dan la vuelta)
//! ```

/// Cola FIFO sobre un buffer circular
#[derive(Debug)]
pub struct RingQueue<T> {
    slots: Vec<Option<T>>,

    /// Índice del próximo elemento a sacar
    head: usize,

    /// Índice del próximo hueco libre
    tail: usize,

    len: usize,
}

impl<T> RingQueue<T> {
    /// Crea una cola con `capacity` huecos (mínimo 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            slots,
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Encola al final. Si está llena, devuelve el elemento.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }

        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.capacity();
        self.len += 1;
        Ok(())
    }

    /// Saca el primero. El hueco queda en `None`.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        item
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Huecos ocupados (para tests)
    #[cfg(test)]
    fn occupied_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = RingQueue::with_capacity(3);
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.push(3).unwrap();

        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_push_when_full_returns_item() {
        let mut queue = RingQueue::with_capacity(2);
        queue.push("a").unwrap();
        queue.push("b").unwrap();

        assert!(queue.is_full());
        assert_eq!(queue.push("c"), Err("c"));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_wraps_around() {
        let mut queue = RingQueue::with_capacity(2);
        for round in 0..5 {
            queue.push(round * 10).unwrap();
            queue.push(round * 10 + 1).unwrap();
            assert_eq!(queue.pop(), Some(round * 10));
            assert_eq!(queue.pop(), Some(round * 10 + 1));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_popped_slot_is_cleared() {
        let mut queue = RingQueue::with_capacity(4);
        queue.push(String::from("x")).unwrap();
        queue.push(String::from("y")).unwrap();
        queue.pop();

        assert_eq!(queue.occupied_slots(), 1);
    }

    #[test]
    fn test_zero_capacity_is_bumped_to_one() {
        let mut queue = RingQueue::with_capacity(0);
        assert_eq!(queue.capacity(), 1);
        queue.push(()).unwrap();
        assert!(queue.is_full());
    }
}
