//! RTC driver state
//!
//! [`Rtc`] owns the platform and the alarm subscription for the lifetime of
//! the firmware. The board stores it in a static so the alarm vector can reach
//! it through the [`InterruptTable`].
//!
//! Boot order: [`Rtc::init_early`] before anything reads persisted state, then
//! [`Rtc::init`] once the logging service is up.

use core::cell::{Cell, RefCell};

use critical_section::Mutex;
use hal_abstractions::RtcPlatform;

use crate::alarm::Subscription;
use crate::calendar;
use crate::clock::{ClockSourceManager, ClockStatus};
use crate::datetime::DateTime;
use crate::error::RtcError;
use crate::interrupt::InterruptTable;
use crate::registers::BackupRegisterStore;

pub struct Rtc<'a, P> {
    pub(crate) hw: Mutex<RefCell<P>>,
    pub(crate) subscription: Mutex<Cell<Option<Subscription>>>,
    pub(crate) alarm_configured: Mutex<Cell<bool>>,
    pub(crate) interrupts: &'a InterruptTable<'a>,
}

impl<'a, P> Rtc<'a, P> {
    pub const fn new(hw: P, interrupts: &'a InterruptTable<'a>) -> Self {
        Self {
            hw: Mutex::new(RefCell::new(hw)),
            subscription: Mutex::new(Cell::new(None)),
            alarm_configured: Mutex::new(Cell::new(false)),
            interrupts,
        }
    }
}

impl<'a, P: RtcPlatform> Rtc<'a, P> {
    /// Run `f` against the platform inside a critical section
    pub(crate) fn with_hw<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.hw.borrow_ref_mut(cs)))
    }

    /// Time accessors stop the calendar or poll shadow registers
    pub(crate) fn assert_thread_context(&self) {
        let in_isr = self.with_hw(|hw| hw.is_interrupt_context());
        assert!(!in_isr, "RTC time accessed from interrupt context");
    }

    /// Bring up the RTC clock and validate the backup register bank
    ///
    /// Recovers a failed LSE, restarting the system if that fails too.
    pub fn init_early(&self) {
        self.with_hw(|hw| {
            hw.enable_rtc_bus_clock();

            let status = ClockSourceManager::new(hw).establish();
            debug!("RTC clock status: {}", status);

            let mut store = BackupRegisterStore::new(hw);
            if !store.verify_header() {
                info!("Backup registers reset");
            }
            store.apply_debug_flag();
        });
    }

    pub fn deinit_early(&self) {
        let subscribed = critical_section::with(|cs| self.subscription.borrow(cs).get().is_some());
        assert!(!subscribed, "RTC torn down with a live alarm callback");
    }

    /// Configure the calendar and replay the persisted logging configuration
    pub fn init(&self) -> Result<(), RtcError> {
        self.with_hw(|hw| {
            calendar::configure(hw)?;
            BackupRegisterStore::new(hw).apply_logging_config();
            Ok::<_, RtcError>(())
        })?;

        info!("Init OK");
        self.set_alarm_output(false);
        Ok(())
    }

    /// Route the alarm to the RTC output pin so it can wake the charger
    pub fn prepare_for_shutdown(&self) {
        self.set_alarm_output(true);
    }

    pub fn sync_shadow(&self) -> Result<(), RtcError> {
        self.with_hw(|hw| calendar::sync_shadow(hw))
    }

    /// Current calendar value
    ///
    /// # Panics
    /// When called from interrupt context.
    pub fn datetime(&self) -> DateTime {
        self.assert_thread_context();
        self.with_hw(|hw| calendar::read_datetime(&*hw))
    }

    /// Load a new calendar value
    ///
    /// # Panics
    /// When called from interrupt context.
    pub fn set_datetime(&self, datetime: &DateTime) -> Result<(), RtcError> {
        self.assert_thread_context();
        debug_assert!(datetime.is_valid());
        self.with_hw(|hw| calendar::write_datetime(hw, datetime))
    }

    /// Seconds since the Unix epoch
    pub fn timestamp(&self) -> u32 {
        self.datetime().timestamp()
    }

    /// Run `f` against the backup register bank inside a critical section
    pub fn with_registers<R>(&self, f: impl FnOnce(&mut BackupRegisterStore<'_, P>) -> R) -> R {
        self.with_hw(|hw| f(&mut BackupRegisterStore::new(hw)))
    }

    pub fn reset_registers(&self) {
        self.with_registers(|store| store.reset_registers());
    }

    pub fn clock_status(&self) -> ClockStatus {
        self.with_hw(|hw| ClockSourceManager::new(hw).status())
    }
}
