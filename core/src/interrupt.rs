//! Interrupt vector hooks
//!
//! The firmware's interrupt vectors call [`InterruptTable::dispatch`]; drivers
//! hook themselves in with [`InterruptTable::set_handler`]. A handler is a
//! reference to the driver, so it carries its own context.

use core::cell::RefCell;

use critical_section::{CriticalSection, Mutex};

/// Interrupt sources routed through the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptId {
    /// RTC alarm A, EXTI line 17
    RtcAlarm,
}

impl InterruptId {
    pub const COUNT: usize = 1;

    const fn index(self) -> usize {
        match self {
            Self::RtcAlarm => 0,
        }
    }
}

/// Routine run when a hooked interrupt fires
pub trait InterruptHandler: Sync {
    fn on_interrupt(&self);
}

type Slots<'a> = [Option<&'a dyn InterruptHandler>; InterruptId::COUNT];

pub struct InterruptTable<'a> {
    slots: Mutex<RefCell<Slots<'a>>>,
}

impl<'a> InterruptTable<'a> {
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new([None; InterruptId::COUNT])),
        }
    }

    /// Hook `handler` to `id`, or unhook it with `None`
    pub fn set_handler(
        &self,
        cs: CriticalSection<'_>,
        id: InterruptId,
        handler: Option<&'a dyn InterruptHandler>,
    ) {
        self.slots.borrow_ref_mut(cs)[id.index()] = handler;
    }

    pub fn is_hooked(&self, id: InterruptId) -> bool {
        critical_section::with(|cs| self.slots.borrow_ref(cs)[id.index()].is_some())
    }

    /// Run the handler hooked to `id`
    ///
    /// Returns `false` when nothing is hooked. The handler runs outside the
    /// table's critical section.
    pub fn dispatch(&self, id: InterruptId) -> bool {
        let handler = critical_section::with(|cs| self.slots.borrow_ref(cs)[id.index()]);

        match handler {
            Some(handler) => {
                handler.on_interrupt();
                true
            }
            None => {
                trace!("Unhooked interrupt {}", id);
                false
            }
        }
    }
}

impl Default for InterruptTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}
