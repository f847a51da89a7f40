use std::{
    fmt::{self, Debug, Display},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

/// Generational index into a [`Pool`]. A handle outlives the object it points to without
/// dangling: once the slot is freed its generation moves on and the handle stops resolving.
pub struct Handle<T> {
    pub index: usize,
    pub generation: usize,
    _pd: PhantomData<T>,
}

impl<T> Handle<T> {
    fn new(index: usize, generation: usize) -> Self {
        Self {
            index,
            generation,
            _pd: PhantomData,
        }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

impl<T> Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Debug)]
pub struct Pool<T> {
    objects: Vec<Option<T>>,
    generations: Vec<usize>,
    free: Vec<usize>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            objects: Default::default(),
            generations: Default::default(),
            free: Default::default(),
        }
    }
}

impl<T> Pool<T> {
    pub fn add(&mut self, object: T) -> Handle<T> {
        if let Some(index) = self.free.pop() {
            self.objects[index] = Some(object);

            return Handle::new(index, self.generations[index]);
        }

        let index = self.objects.len();
        self.objects.push(Some(object));
        self.generations.push(0);

        Handle::new(index, 0)
    }

    /// Frees the slot and bumps its generation so every outstanding handle goes stale.
    pub fn remove(&mut self, handle: &Handle<T>) -> Option<T> {
        if !self.contains(handle) {
            return None;
        }

        let object = self.objects[handle.index].take();
        self.generations[handle.index] += 1;
        self.free.push(handle.index);

        object
    }

    pub fn contains(&self, handle: &Handle<T>) -> bool {
        handle.index < self.objects.len()
            && handle.generation == self.generations[handle.index]
            && self.objects[handle.index].is_some()
    }

    pub fn get(&self, handle: &Handle<T>) -> Option<&T> {
        if handle.index < self.objects.len() && handle.generation == self.generations[handle.index]
        {
            self.objects[handle.index].as_ref()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, handle: &Handle<T>) -> Option<&mut T> {
        if handle.index < self.objects.len() && handle.generation == self.generations[handle.index]
        {
            self.objects[handle.index].as_mut()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(index, object)| {
                object
                    .as_ref()
                    .map(|object| (Handle::new(index, self.generations[index]), object))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_handle_goes_stale_when_slot_is_reused() {
        let mut pool = Pool::default();
        let first = pool.add("first");
        assert_eq!(pool.remove(&first), Some("first"));

        let second = pool.add("second");

        assert_eq!(second.index, first.index);
        assert_ne!(second, first);
        assert_eq!(pool.get(&first), None);
        assert_eq!(pool.get(&second), Some(&"second"));
    }

    #[test]
    fn double_remove_is_a_no_op() {
        let mut pool = Pool::default();
        let handle = pool.add(1);

        assert_eq!(pool.remove(&handle), Some(1));
        assert_eq!(pool.remove(&handle), None);
        assert!(pool.is_empty());
    }

    #[test]
    fn iter_skips_free_slots() {
        let mut pool = Pool::default();
        let a = pool.add('a');
        let b = pool.add('b');
        let c = pool.add('c');
        pool.remove(&b);

        let handles = pool.iter().map(|(handle, _)| handle).collect::<Vec<_>>();

        assert_eq!(handles, vec![a, c]);
        assert_eq!(pool.len(), 2);
    }
}
