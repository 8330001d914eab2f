use super::KeyedVec;
use super::StorageKey;

/// An arena whose keys stay valid until the value behind them is removed.
///
/// Removal is O(1); freed slots are reused by later insertions. Iteration skips empty slots and
/// visits the live values in key order.
#[derive(Debug, Clone)]
pub struct SlotArena<Key, Value> {
    slots: KeyedVec<Key, Option<Value>>,
    free: Vec<Key>,
    len: usize,
}

impl<Key, Value> Default for SlotArena<Key, Value> {
    fn default() -> Self {
        Self {
            slots: KeyedVec::default(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<Key: StorageKey, Value> SlotArena<Key, Value> {
    /// The number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of slots, live or free. Every key handed out is smaller than this.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn insert(&mut self, value: Value) -> Key {
        self.len += 1;

        match self.free.pop() {
            Some(key) => {
                self.slots[key] = Some(value);
                key
            }
            None => self.slots.push(Some(value)),
        }
    }

    pub fn remove(&mut self, key: Key) -> Option<Value> {
        let value = self.slots.get_mut(key)?.take()?;
        self.free.push(key);
        self.len -= 1;

        Some(value)
    }

    pub fn get(&self, key: Key) -> Option<&Value> {
        self.slots.get(key)?.as_ref()
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut Value> {
        self.slots.get_mut(key)?.as_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Key, &'_ Value)> {
        self.slots
            .enumerate()
            .filter_map(|(key, slot)| slot.as_ref().map(|value| (key, value)))
    }
}
