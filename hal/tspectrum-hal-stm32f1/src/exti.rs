//! External interrupt line for the legacy strobe
//!
//! The edge trigger is configured once and the line stays unmasked for the
//! rest of the run. The interrupt handler is bound by the firmware; it only
//! has to call [`StrobeLine::clear_pending`] after servicing the edge.

use embassy_stm32::pac;

/// Edge that raises the interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

/// One EXTI line routed from a GPIO port
#[derive(Debug, Clone, Copy)]
pub struct StrobeLine {
    line: u8,
}

impl StrobeLine {
    /// Route `port` (A = 0, B = 1, ...) to EXTI `line` and select the edge
    ///
    /// The line is left masked; call [`unmask`](Self::unmask) when interrupts
    /// may be taken.
    pub fn configure(port: u8, line: u8, edge: Edge) -> Self {
        let n = line as usize;

        pac::RCC.apb2enr().modify(|w| w.set_afioen(true));
        pac::AFIO.exticr(n / 4).modify(|w| w.set_exti(n % 4, port));

        pac::EXTI.imr(0).modify(|w| w.set_line(n, false));
        pac::EXTI
            .rtsr(0)
            .modify(|w| w.set_line(n, edge == Edge::Rising));
        pac::EXTI
            .ftsr(0)
            .modify(|w| w.set_line(n, edge == Edge::Falling));

        let out = Self { line };
        out.clear_pending();
        out
    }

    /// Let the line raise interrupts
    pub fn unmask(&self) {
        pac::EXTI
            .imr(0)
            .modify(|w| w.set_line(self.line as usize, true));
    }

    /// Acknowledge a serviced edge
    pub fn clear_pending(&self) {
        // PR is write-one-to-clear
        pac::EXTI
            .pr(0)
            .write(|w| w.set_line(self.line as usize, true));
    }

    /// EXTI line number
    pub fn line(&self) -> u8 {
        self.line
    }
}
