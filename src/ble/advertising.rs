//! Deferred advertising start.
//!
//! Lifecycle events arrive in stack callback context, which must neither
//! block nor re-enter the advertising API. They only *request* a start;
//! the advertising task waits on the single work item and performs the
//! start itself. Requests made while one is already pending coalesce.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

use super::adv_payload::{AdvPayload, AdvPayloadBuilder, FLAG_LE_GENERAL_DISC, FLAG_NO_BREDR};
use crate::config::{ADV_INTERVAL_MAX, ADV_INTERVAL_MIN, DEVICE_NAME};
use crate::error::Error;
use crate::lbs::schema::LBS_SERVICE_UUID;

/// Fixed advertising parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdvertisingParams {
    pub connectable: bool,
    /// Advertise with the identity address rather than a private one.
    pub use_identity: bool,
    /// Interval bounds in 0.625 ms units.
    pub interval_min: u32,
    pub interval_max: u32,
}

impl AdvertisingParams {
    pub const LBS: AdvertisingParams = AdvertisingParams {
        connectable: true,
        use_identity: true,
        interval_min: ADV_INTERVAL_MIN,
        interval_max: ADV_INTERVAL_MAX,
    };
}

/// Parameters plus the advertising and scan-response payloads.
pub struct AdvertisingSet {
    pub params: AdvertisingParams,
    pub adv_data: AdvPayload,
    pub scan_data: AdvPayload,
}

impl AdvertisingSet {
    /// Flags + complete name; scan response carries the LBS UUID.
    pub fn lbs() -> Result<Self, Error> {
        let adv_data = AdvPayloadBuilder::new()
            .flags(FLAG_LE_GENERAL_DISC | FLAG_NO_BREDR)?
            .complete_name(DEVICE_NAME)?
            .build();
        let scan_data = AdvPayloadBuilder::new()
            .uuid128_all(LBS_SERVICE_UUID)?
            .build();
        Ok(Self {
            params: AdvertisingParams::LBS,
            adv_data,
            scan_data,
        })
    }
}

/// The stack's advertising primitive.
#[allow(async_fn_in_trait)]
pub trait Advertiser {
    /// Connection handed back once a central connects.
    type Link;

    /// Start connectable advertising; resolves when a central connects or
    /// the start fails.
    async fn advertise(
        &mut self,
        params: &AdvertisingParams,
        adv_data: &[u8],
        scan_data: &[u8],
    ) -> Result<Self::Link, Error>;
}

/// Owner of the single advertising work item.
pub struct AdvertisingScheduler<M: RawMutex> {
    work: Signal<M, ()>,
}

impl<M: RawMutex> Default for AdvertisingScheduler<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> AdvertisingScheduler<M> {
    pub const fn new() -> Self {
        Self {
            work: Signal::new(),
        }
    }

    /// Submit the work item. Callable from any context; never blocks.
    pub fn request_start(&self) {
        if self.work.signaled() {
            debug!("Advertising start already pending");
        }
        self.work.signal(());
    }

    /// Whether a submission is waiting for the advertising task.
    pub fn is_pending(&self) -> bool {
        self.work.signaled()
    }

    /// Consume a pending submission without waiting.
    pub fn take_pending(&self) -> bool {
        self.work.try_take().is_some()
    }

    /// Wait for the next submission, then make exactly one advertising
    /// attempt.
    ///
    /// A failed start is logged and not retried; the next lifecycle
    /// request is the only thing that triggers another attempt.
    pub async fn run_once<A: Advertiser>(
        &self,
        advertiser: &mut A,
        set: &AdvertisingSet,
    ) -> Option<A::Link> {
        self.work.wait().await;
        self.start_now(advertiser, set).await
    }

    async fn start_now<A: Advertiser>(
        &self,
        advertiser: &mut A,
        set: &AdvertisingSet,
    ) -> Option<A::Link> {
        info!("Starting advertising");
        match advertiser
            .advertise(&set.params, &set.adv_data, &set.scan_data)
            .await
        {
            Ok(link) => Some(link),
            Err(e) => {
                error!("Advertising failed to start: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ble::adv_payload::{contains_service_uuid128, extract_device_name};
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    struct CountingAdvertiser {
        calls: usize,
        fail: bool,
    }

    impl Advertiser for CountingAdvertiser {
        type Link = usize;

        async fn advertise(
            &mut self,
            params: &AdvertisingParams,
            adv_data: &[u8],
            scan_data: &[u8],
        ) -> Result<usize, Error> {
            assert_eq!(*params, AdvertisingParams::LBS);
            assert!(!adv_data.is_empty());
            assert!(!scan_data.is_empty());
            self.calls += 1;
            if self.fail {
                Err(Error::AdvertisingFailed(Some(8)))
            } else {
                Ok(self.calls)
            }
        }
    }

    #[test]
    fn lbs_set_contents() {
        let set = AdvertisingSet::lbs().unwrap();
        assert_eq!(&set.adv_data[..3], &[0x02, 0x01, 0x06]);
        assert_eq!(extract_device_name(&set.adv_data).as_str(), DEVICE_NAME);
        assert!(contains_service_uuid128(&set.scan_data, LBS_SERVICE_UUID));
        assert_eq!(set.params.interval_min, 800);
        assert_eq!(set.params.interval_max, 801);
        assert!(set.params.connectable && set.params.use_identity);
    }

    #[test]
    fn requests_coalesce_into_one_start() {
        let scheduler: AdvertisingScheduler<NoopRawMutex> = AdvertisingScheduler::new();
        let set = AdvertisingSet::lbs().unwrap();
        let mut adv = CountingAdvertiser {
            calls: 0,
            fail: false,
        };

        scheduler.request_start();
        scheduler.request_start();
        scheduler.request_start();
        assert!(scheduler.is_pending());

        assert_eq!(block_on(scheduler.run_once(&mut adv, &set)), Some(1));
        assert!(!scheduler.is_pending());
        assert_eq!(adv.calls, 1);
    }

    #[test]
    fn failed_start_is_not_retried() {
        let scheduler: AdvertisingScheduler<NoopRawMutex> = AdvertisingScheduler::new();
        let set = AdvertisingSet::lbs().unwrap();
        let mut adv = CountingAdvertiser {
            calls: 0,
            fail: true,
        };

        scheduler.request_start();
        assert_eq!(block_on(scheduler.run_once(&mut adv, &set)), None);
        assert_eq!(adv.calls, 1);
        assert!(!scheduler.is_pending());
    }

    #[test]
    fn take_pending_consumes_once() {
        let scheduler: AdvertisingScheduler<NoopRawMutex> = AdvertisingScheduler::new();
        assert!(!scheduler.take_pending());
        scheduler.request_start();
        scheduler.request_start();
        assert!(scheduler.take_pending());
        assert!(!scheduler.take_pending());
    }
}
