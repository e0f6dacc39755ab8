//! Wake alarm
//!
//! Alarm A matches on hour, minute and second; date and weekday are masked so
//! it fires once a day. A match is delivered to a single subscriber through
//! RTC alarm flag -> EXTI line 17 -> NVIC -> [`InterruptId::RtcAlarm`].
//!
//! Registering a subscriber runs the dispatch routine once, so a match that
//! happened before registration is not lost.

use critical_section::CriticalSection;
use hal_abstractions::{ExtiLine, RtcPlatform};

use crate::calendar::WriteUnlocked;
use crate::datetime::{self, DateTime};
use crate::interrupt::{InterruptHandler, InterruptId};
use crate::rtc::Rtc;

/// Opaque value handed back to the alarm callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmContext(pub usize);

/// Alarm callback, run in interrupt context
pub type AlarmCallback = fn(AlarmContext);

#[derive(Clone, Copy)]
pub(crate) struct Subscription {
    callback: AlarmCallback,
    context: AlarmContext,
}

/// Programmed alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmSetting {
    /// Match time; date fields are zero
    pub time: DateTime,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmState {
    /// No match time programmed since boot
    Unconfigured,
    ConfiguredDisabled,
    ConfiguredEnabled,
}

impl<'a, P: RtcPlatform> Rtc<'a, P> {
    /// Program the alarm match time and arm or disarm it
    ///
    /// With `time` set to `None` only the enable state changes.
    ///
    /// # Panics
    /// When called from interrupt context.
    pub fn set_alarm(&self, time: Option<&DateTime>, enabled: bool) {
        self.assert_thread_context();

        critical_section::with(|cs| {
            let mut hw = self.hw.borrow_ref_mut(cs);
            let mut rtc = WriteUnlocked::new(&mut *hw);

            if let Some(time) = time {
                rtc.set_alarm_time_bcd(datetime::encode_time(time));
                rtc.set_alarm_date_masked(true);
                self.alarm_configured.borrow(cs).set(true);
            }

            if enabled {
                rtc.clear_alarm_flag();
                rtc.set_alarm_enabled(true);
            } else {
                rtc.set_alarm_enabled(false);
                rtc.clear_alarm_flag();
            }
        });
    }

    pub fn alarm(&self) -> AlarmSetting {
        critical_section::with(|cs| {
            let hw = self.hw.borrow_ref(cs);
            AlarmSetting {
                time: datetime::decode_time(hw.alarm_time_bcd()),
                enabled: hw.is_alarm_enabled(),
            }
        })
    }

    pub fn alarm_state(&self) -> AlarmState {
        critical_section::with(|cs| {
            if !self.alarm_configured.borrow(cs).get() {
                AlarmState::Unconfigured
            } else if self.hw.borrow_ref(cs).is_alarm_enabled() {
                AlarmState::ConfiguredEnabled
            } else {
                AlarmState::ConfiguredDisabled
            }
        })
    }

    /// Drive the RTC alarm output pin (active low, open drain) from alarm A
    pub fn set_alarm_output(&self, enabled: bool) {
        critical_section::with(|cs| {
            let mut hw = self.hw.borrow_ref_mut(cs);
            WriteUnlocked::new(&mut *hw).set_alarm_output(enabled);
        });
    }

    /// Subscribe to alarm matches
    ///
    /// # Panics
    /// When a callback is already registered, or when a pending match is
    /// delivered and the callback panics.
    pub fn register_callback(&'a self, callback: AlarmCallback, context: AlarmContext)
    where
        P: Send + 'a,
    {
        critical_section::with(|cs| {
            let subscription = self.subscription.borrow(cs);
            assert!(
                subscription.get().is_none(),
                "RTC alarm callback already registered"
            );
            subscription.set(Some(Subscription { callback, context }));

            {
                let mut hw = self.hw.borrow_ref_mut(cs);
                let mut rtc = WriteUnlocked::new(&mut *hw);
                rtc.set_rising_trigger(ExtiLine::RTC_ALARM, true);
                rtc.set_line_interrupt(ExtiLine::RTC_ALARM, true);
                self.interrupts.set_handler(cs, InterruptId::RtcAlarm, Some(self));
                rtc.set_alarm_interrupt(true);
            }

            self.dispatch_alarm(cs);
        });

        debug!("RTC alarm callback registered");
    }

    /// Drop the alarm subscriber and tear down its interrupt chain
    ///
    /// # Panics
    /// When no callback is registered.
    pub fn unregister_callback(&self) {
        critical_section::with(|cs| {
            let subscription = self.subscription.borrow(cs);
            assert!(
                subscription.get().is_some(),
                "No RTC alarm callback registered"
            );

            let mut hw = self.hw.borrow_ref_mut(cs);
            let mut rtc = WriteUnlocked::new(&mut *hw);
            rtc.set_alarm_interrupt(false);
            rtc.set_line_interrupt(ExtiLine::RTC_ALARM, false);
            rtc.clear_pending(ExtiLine::RTC_ALARM);
            rtc.set_rising_trigger(ExtiLine::RTC_ALARM, false);
            self.interrupts.set_handler(cs, InterruptId::RtcAlarm, None);

            subscription.set(None);
        });

        debug!("RTC alarm callback unregistered");
    }

    fn dispatch_alarm(&self, cs: CriticalSection<'_>) {
        let fired = {
            let mut hw = self.hw.borrow_ref_mut(cs);
            let fired = hw.is_alarm_flag_set();
            if fired {
                hw.clear_alarm_flag();
            }
            fired
        };

        if fired {
            match self.subscription.borrow(cs).get() {
                Some(subscription) => (subscription.callback)(subscription.context),
                None => panic!("RTC alarm fired with no callback registered"),
            }
        }

        self.hw.borrow_ref_mut(cs).clear_pending(ExtiLine::RTC_ALARM);
    }
}

impl<P: RtcPlatform + Send> InterruptHandler for Rtc<'_, P> {
    fn on_interrupt(&self) {
        critical_section::with(|cs| self.dispatch_alarm(cs));
    }
}
