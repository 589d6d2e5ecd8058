// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F767ZI glitch board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpioc, gpiod, Alternate},
    pac,
    prelude::*,
};

use super::gpio::{InputLine, OutputLine};
use super::led::Led;
use super::spi::ChipSelect;

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD);
/// ```
pub struct BoardPins {
    pub usart1: Usart1Pins,
    pub usart3: Usart3Pins,
    pub spi1: Spi1Pins,
    pub fpga: FpgaPins,
    pub led: Led<OutputLine<'B', 7>>,
}

/// Host request channel.
pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// Debug log (ST-LINK virtual COM port).
pub struct Usart3Pins {
    pub tx: gpiod::PD8<Alternate<7>>,
    pub rx: gpiod::PD9<Alternate<7>>,
}

/// SPI1 SCK/MISO/MOSI and CS to the FPGA
pub struct Spi1Pins {
    pub sck: gpioa::PA5<Alternate<5>>,
    pub miso: gpioa::PA6<Alternate<5>>,
    pub mosi: gpioa::PA7<Alternate<5>>,
    pub cs: ChipSelect<'A', 4>,
}

/// FPGA power enable and status
pub struct FpgaPins {
    pub power_en: OutputLine<'C', 8>,
    pub status: InputLine<'C', 9>,
}

impl BoardPins {
    pub fn new(
        gpioa: pac::GPIOA,
        gpiob: pac::GPIOB,
        gpioc: pac::GPIOC,
        gpiod: pac::GPIOD,
    ) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpioc = gpioc.split();
        let gpiod = gpiod.split();

        Self {
            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            usart3: Usart3Pins {
                tx: gpiod.pd8.into_alternate::<7>(),
                rx: gpiod.pd9.into_alternate::<7>(),
            },

            spi1: Spi1Pins {
                sck: gpioa.pa5.into_alternate::<5>(),
                miso: gpioa.pa6.into_alternate::<5>(),
                mosi: gpioa.pa7.into_alternate::<5>(),
                cs: ChipSelect::active_low(gpioa.pa4),
            },

            // Power stays off until the first reset request.
            fpga: FpgaPins {
                power_en: OutputLine::new(gpioc.pc8),
                status: InputLine::pull_up(gpioc.pc9),
            },

            // LD2 (blue) on the Nucleo-144
            led: Led::active_high(OutputLine::new(gpiob.pb7)),
        }
    }
}
