//! Firmware entry point - nRF52840 + SoftDevice S140.
//!
//! Brings up the servo, LEDs, button and radio, registers the LED Button
//! Service, spawns the long-running tasks and then blinks the run-status
//! LED forever. Any startup failure is logged and the firmware stops
//! before entering steady-state operation.

#![no_std]
#![no_main]

use core::mem;

use defmt::{error, info, unwrap};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive, Pin};
use embassy_nrf::interrupt::Priority;
use embassy_nrf::peripherals::PWM0;
use embassy_nrf::pwm::SimplePwm;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver};
use embassy_time::{Delay, Duration, Timer};
use nrf_softdevice::ble::gatt_server;
use nrf_softdevice::{raw, Softdevice};
use panic_probe as _;
use static_cell::StaticCell;

use lbs_servo::actuator::pwm::PwmServo;
use lbs_servo::actuator::{ActuatorSequencer, MotionCommand, MotionQueue, Servo};
use lbs_servo::ble::softdevice::{LbsServer, SoftdeviceAdvertiser};
use lbs_servo::ble::{
    AdvertisingScheduler, AdvertisingSet, ConnectionLifecycleManager, LifecycleEvent,
};
use lbs_servo::config::{
    BUTTON1_MASK, DEVICE_NAME, MOTION_QUEUE_DEPTH, RUN_STATUS_BLINK_MS, SERVO_MIN_PULSE_NS,
};
use lbs_servo::error::{Error, StartupError};
use lbs_servo::input::{buttons, ButtonState};
use lbs_servo::lbs::{Callbacks, ServiceEndpoint};
use lbs_servo::status::{ActiveLow, RunStatus};

type Sequencer = ActuatorSequencer<PwmServo<'static, PWM0>, ActiveLow<Output<'static>>, Delay>;
type MotionChannel = Channel<CriticalSectionRawMutex, MotionCommand, MOTION_QUEUE_DEPTH>;
type MotionReceiver = Receiver<'static, CriticalSectionRawMutex, MotionCommand, MOTION_QUEUE_DEPTH>;
type Scheduler = AdvertisingScheduler<CriticalSectionRawMutex>;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Starting BLE servo app");

    // The SoftDevice reserves priorities 0, 1 and 4.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    // Servo parked at the device minimum before anything can move it.
    let mut servo = PwmServo::new(SimplePwm::new_1ch(p.PWM0, p.P0_03));
    if let Err(e) = servo.set_pulse_width(SERVO_MIN_PULSE_NS) {
        error!("Servo init failed: {}", e);
        error!("{}", Error::Startup(StartupError::Servo));
        return;
    }

    // DK LEDs are active-low; start dark.
    let indicator = ActiveLow::new(Output::new(p.P0_14, Level::High, OutputDrive::Standard));
    let mut run_status = RunStatus::new(ActiveLow::new(Output::new(
        p.P0_13,
        Level::High,
        OutputDrive::Standard,
    )));

    let adv_set = match AdvertisingSet::lbs() {
        Ok(set) => set,
        Err(e) => {
            error!("Advertising payload invalid: {}", e);
            return;
        }
    };

    static BUTTON: StaticCell<ButtonState> = StaticCell::new();
    static MOTION: StaticCell<MotionChannel> = StaticCell::new();
    static ADVERTISING: StaticCell<Scheduler> = StaticCell::new();
    static SERVER: StaticCell<LbsServer> = StaticCell::new();

    let button: &'static ButtonState = BUTTON.init(ButtonState::new(BUTTON1_MASK));
    let motion: &'static MotionChannel = MOTION.init(Channel::new());
    let advertising: &'static Scheduler = ADVERTISING.init(AdvertisingScheduler::new());

    let sd = Softdevice::enable(&softdevice_config());
    info!("Bluetooth initialized");

    let callbacks = Callbacks::new(MotionQueue::new(motion.sender()), button);
    let server = match LbsServer::new(sd, ServiceEndpoint::new(callbacks)) {
        Ok(server) => SERVER.init(server),
        Err(e) => {
            error!("Failed to init LBS: {}", e);
            error!("{}", Error::Startup(StartupError::ServiceRegistration));
            return;
        }
    };
    info!("LBS initialized");

    let sd: &'static Softdevice = sd;
    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(motion_task(
        ActuatorSequencer::new(servo, indicator, Delay),
        motion.receiver(),
    )));
    unwrap!(spawner.spawn(button_task(p.P0_11.degrade(), button)));
    unwrap!(spawner.spawn(peripheral_task(sd, server, advertising, adv_set)));

    loop {
        run_status.tick();
        Timer::after(Duration::from_millis(RUN_STATUS_BLINK_MS)).await;
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Advertise, serve one connection, then re-advertise once the
/// connection object is released.
#[embassy_executor::task]
async fn peripheral_task(
    sd: &'static Softdevice,
    server: &'static LbsServer,
    advertising: &'static Scheduler,
    adv_set: AdvertisingSet,
) -> ! {
    let mut advertiser = SoftdeviceAdvertiser::new(sd);
    let mut lifecycle = ConnectionLifecycleManager::start(advertising);

    loop {
        let Some(conn) = advertising.run_once(&mut advertiser, &adv_set).await else {
            continue;
        };
        let _ = lifecycle.handle(LifecycleEvent::Connected);

        let _ = gatt_server::run(&conn, server, |_| {}).await;
        let _ = lifecycle.handle(LifecycleEvent::Disconnected { reason: None });

        drop(conn);
        let _ = lifecycle.handle(LifecycleEvent::Recycled);
    }
}

/// Runs queued motion commands one at a time, outside the GATT callback.
#[embassy_executor::task]
async fn motion_task(mut sequencer: Sequencer, rx: MotionReceiver) -> ! {
    loop {
        let command = rx.receive().await;
        // Failures are logged by the sequencer.
        let _ = sequencer.execute(command).await;
    }
}

#[embassy_executor::task]
async fn button_task(pin: AnyPin, state: &'static ButtonState) -> ! {
    buttons::button_task(pin, state).await
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 23 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}
