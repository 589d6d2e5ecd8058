#![no_main]
#![no_std]

use cortex_m::delay::Delay;
use cortex_m_rt::entry;
use log::{error, info, LevelFilter};
use nb::block;
use panic_halt as _;

use hal::{
    flash::Flash,
    pac,
    prelude::*,
    serial::{Config, Serial},
    spi::{Mode, Phase, Polarity, Spi},
};
use stm32f7xx_hal as hal;

use glitchfw::calibration::CalibrationStore;
use glitchfw::controller::Controller;
use glitchfw::fpga::{Fpga, PowerSequencer};
use glitchfw::hw::{logger, BoardPins, FlashStorage, HostPort, SpiLink, SysDelay, Usart};
use glitchfw::protocol::messages::{MAX_RESPONSE, MAX_RESPONSE_PAYLOAD};
use glitchfw::protocol::{Parser, Response};

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let mut apb2 = rcc.apb2;

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD);

    // USART3 (DBG)
    let dbg_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let dbg = Serial::new(dp.USART3, (pins.usart3.tx, pins.usart3.rx), &clocks, dbg_cfg);
    logger::init(Usart::new(dbg), LevelFilter::Info);
    info!("glitchfw starting");

    // USART1 (host)
    let host_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let host_serial = Serial::new(
        dp.USART1,
        (pins.usart1.tx, pins.usart1.rx),
        &clocks,
        host_cfg,
    );
    let mut host = HostPort::new(host_serial);

    // SPI1 (FPGA), mode 3
    let spi_mode = Mode {
        polarity: Polarity::IdleHigh,
        phase: Phase::CaptureOnSecondTransition,
    };
    let spi1 = Spi::new(dp.SPI1, (pins.spi1.sck, pins.spi1.miso, pins.spi1.mosi))
        .enable::<u8>(spi_mode, 1.MHz(), &clocks, &mut apb2);
    let link = SpiLink::new(spi1, pins.spi1.cs);
    let mut led = pins.led;

    // SysTick delay from cortex-m, needs core clock in Hz (u32)
    let delay = SysDelay::new(Delay::new(cp.SYST, clocks.sysclk().raw()));

    let mut controller = Controller::new(
        Fpga::new(link),
        PowerSequencer::new(pins.fpga.power_en, pins.fpga.status),
        delay,
        CalibrationStore::new(FlashStorage::new(Flash::new(dp.FLASH))),
    );
    if let Err(e) = controller.start() {
        error!("startup failed: {}", e);
    }
    led.show(controller.power().state());

    let mut parser = Parser::new();
    let mut payload = [0u8; MAX_RESPONSE_PAYLOAD];
    let mut frame = [0u8; MAX_RESPONSE];

    loop {
        let byte = match block!(host.read_byte()) {
            Ok(b) => b,
            Err(_) => continue, // framing/overrun: drop the byte
        };

        if let Some(request) = parser.push(byte) {
            let reply = controller.handle(&request, &mut payload);
            let response = Response {
                id: request.id(),
                status: reply.status,
                payload: &payload[..reply.len],
            };
            if let Some(n) = response.encode(&mut frame) {
                host.write_all(&frame[..n]);
            }
            led.show(controller.power().state());
        }
    }
}
