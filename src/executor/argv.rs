//! Fixed-capacity argument vector reused by every helper invocation.
//!
//! The vector owns [`ARGV_SLOTS`] buffers of [`ARG_CAPACITY`] bytes each. A
//! helper populates a prefix of the slots and the end marker sits right after
//! it, so stale contents from an earlier command are never visible.

use std::collections::TryReserveError;

/// Number of slots: three arguments plus the end marker.
pub const ARGV_SLOTS: usize = 4;

/// Capacity of one slot in bytes. A stored argument must be strictly shorter,
/// leaving room for a terminating NUL on the C side of the exec boundary.
pub const ARG_CAPACITY: usize = 128;

/// Errors produced while acquiring the argument buffers.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    /// The slot table itself could not be allocated.
    #[error("failed to allocate argument vector of {size} slots: {source}")]
    Vector {
        /// Requested number of slots.
        size: usize,
        /// Underlying allocator error.
        #[source]
        source: TryReserveError,
    },
    /// One of the slot buffers could not be allocated.
    #[error("failed to allocate argument slot {slot}: {source}")]
    Slot {
        /// Index of the slot that failed.
        slot: usize,
        /// Underlying allocator error.
        #[source]
        source: TryReserveError,
    },
}

/// Errors produced while populating the argument vector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgvError {
    /// An argument does not fit in its slot.
    #[error("argument {index} is {len} bytes, slot capacity is {capacity}")]
    TooLong {
        /// Position of the offending argument.
        index: usize,
        /// Length of the argument in bytes.
        len: usize,
        /// Slot capacity in bytes.
        capacity: usize,
    },
    /// No slot is left for the end marker.
    #[error("{count} arguments leave no room for the end marker in {size} slots")]
    NoTerminator {
        /// Number of arguments supplied.
        count: usize,
        /// Number of slots in the vector.
        size: usize,
    },
}

/// Owned argument vector with an end marker after the populated prefix.
#[derive(Debug)]
pub struct ArgVector {
    slots: Vec<String>,
    capacity: usize,
    len: usize,
}

impl ArgVector {
    /// Acquire `size` slots of [`ARG_CAPACITY`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError`] if any allocation fails. Slots allocated
    /// before the failure are released before returning.
    pub fn acquire(size: usize) -> Result<Self, AllocationError> {
        Self::acquire_with_capacity(size, ARG_CAPACITY)
    }

    /// Acquire `size` slots of `capacity` bytes each.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError`] if any allocation fails.
    pub fn acquire_with_capacity(size: usize, capacity: usize) -> Result<Self, AllocationError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(size)
            .map_err(|source| AllocationError::Vector { size, source })?;

        for slot in 0..size {
            let mut buf = String::new();
            // On failure `slots` drops here and frees every earlier buffer.
            buf.try_reserve_exact(capacity)
                .map_err(|source| AllocationError::Slot { slot, source })?;
            slots.push(buf);
        }

        Ok(Self {
            slots,
            capacity,
            len: 0,
        })
    }

    /// Overwrite the vector with `args` and place the end marker after them.
    ///
    /// On error the vector is left empty so a stale command can never run.
    ///
    /// # Errors
    ///
    /// Returns [`ArgvError`] when an argument does not fit in a slot or when
    /// no slot remains for the end marker.
    pub fn populate(&mut self, args: &[&str]) -> Result<(), ArgvError> {
        self.len = 0;

        if args.len() >= self.slots.len() {
            return Err(ArgvError::NoTerminator {
                count: args.len(),
                size: self.slots.len(),
            });
        }

        for (index, arg) in args.iter().enumerate() {
            if arg.len() >= self.capacity {
                return Err(ArgvError::TooLong {
                    index,
                    len: arg.len(),
                    capacity: self.capacity,
                });
            }
        }

        for (slot, arg) in self.slots.iter_mut().zip(args) {
            slot.clear();
            slot.push_str(arg);
        }
        self.len = args.len();
        Ok(())
    }

    /// Argument at `index`, or `None` at and beyond the end marker.
    pub fn get(&self, index: usize) -> Option<&str> {
        if index < self.len {
            self.slots.get(index).map(String::as_str)
        } else {
            None
        }
    }

    /// Populated arguments, in order.
    pub fn args(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().take(self.len).map(String::as_str)
    }

    /// Split into the program path (`argv[0]`) and its arguments.
    pub fn split_program(&self) -> Option<(&str, Vec<&str>)> {
        let mut args = self.args();
        let program = args.next()?;
        Some((program, args.collect()))
    }

    /// Index of the end marker, equal to the number of populated arguments.
    pub fn terminator(&self) -> usize {
        self.len
    }

    /// Number of populated arguments.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no argument is populated.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of slots, including the one reserved for the end marker.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Capacity of each slot in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Release every slot and then the vector itself.
    pub fn release(self) {
        tracing::trace!(slots = self.slots.len(), "releasing argument buffers");
        drop(self);
    }
}
