use crate::graphics::Texture;

/// Outcome of a slot lookup. `NeedsFlush` means every non-reserved slot is
/// occupied by a different texture; the caller flushes, resets, and retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotResolution {
    Slot(u32),
    NeedsFlush,
}

/// Bounded table mapping texture identities to dense sampler slots.
///
/// Slots `[0, reserved)` are system bindings (slot 0 holds the default
/// white texture) fixed at construction and never evicted. The rest are
/// handed out first-come within a batch; the same identity always resolves
/// to the same slot until the next `reset`.
pub struct TextureSlotTable<T: Texture> {
    slots: Vec<Option<T>>,
    reserved: u32,
    cursor: u32,
}

impl<T: Texture> TextureSlotTable<T> {
    /// `reserved_textures` occupy slots `0..reserved_textures.len()`.
    pub fn new(max_slots: u32, reserved_textures: Vec<T>) -> Self {
        let reserved = reserved_textures.len() as u32;
        debug_assert!(reserved < max_slots, "reserved slots exhaust the table");

        let mut slots: Vec<Option<T>> = Vec::with_capacity(max_slots as usize);
        slots.extend(reserved_textures.into_iter().map(Some));
        slots.resize_with(max_slots as usize, || None);

        Self {
            slots,
            reserved,
            cursor: reserved,
        }
    }

    /// Rewinds the cursor to the first non-reserved slot and drops the
    /// non-reserved bindings. Reserved slots keep their textures.
    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut().skip(self.reserved as usize) {
            *slot = None;
        }
        self.cursor = self.reserved;
    }

    /// Linear scan over the active non-reserved slots, O(active slots) with
    /// the table bounded at `max_slots`. Discovery order decides which slot
    /// an identity keeps for the rest of the batch.
    pub fn resolve(&mut self, texture: &T) -> SlotResolution {
        let id = texture.id();
        for i in self.reserved..self.cursor {
            if let Some(bound) = &self.slots[i as usize] {
                if bound.id() == id {
                    return SlotResolution::Slot(i);
                }
            }
        }

        if self.cursor as usize == self.slots.len() {
            return SlotResolution::NeedsFlush;
        }

        let slot = self.cursor;
        self.slots[slot as usize] = Some(texture.clone());
        self.cursor += 1;
        SlotResolution::Slot(slot)
    }

    /// Issues one `bind` per active non-reserved slot. Called once per
    /// flush, not once per draw. Reserved slots were bound at init.
    pub fn bind_all(&self) {
        for i in self.reserved..self.cursor {
            if let Some(texture) = &self.slots[i as usize] {
                texture.bind(i);
            }
        }
    }

    /// Next free slot index; equals `reserved` right after a reset.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    pub fn max_slots(&self) -> u32 {
        self.slots.len() as u32
    }
}
