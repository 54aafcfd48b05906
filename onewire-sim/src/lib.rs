#![no_std]
//! A 1-Wire bus simulator following the behavior of real bus devices in the
//! search operation: wired-AND bit reads, per-device deselection on a
//! mismatched write, and alarm gating for the conditional search command.
//!
//! [SimBus] implements [OneWireBus] and is intended as a test double for the
//! search algorithm; it models the protocol, not the electrical timing.

use core::convert::Infallible;
use onewire_search::{ONEWIRE_CONDITIONAL_SEARCH_CMD, OneWireBus, RomCode};

/// One simulated device. The `selected`, `rompos` and `reads` fields are
/// transient per-transaction state, rearmed by every reset pulse.
#[derive(Debug, Clone, Copy)]
struct SimDevice {
    rom: RomCode,
    alarmed: bool,
    selected: bool,
    rompos: u8,
    reads: u8,
}

impl SimDevice {
    fn new(rom: RomCode, alarmed: bool) -> Self {
        Self {
            rom,
            alarmed,
            selected: false,
            rompos: 0,
            reads: 0,
        }
    }

    fn rearm(&mut self) {
        self.selected = true;
        self.rompos = 0;
        self.reads = 0;
    }

    /// The device's vote for the current read slot. Deselected devices release
    /// the line, which reads as 1; so does a device that has already walked
    /// all 64 ROM bits of the transaction.
    fn read(&mut self) -> bool {
        if !self.selected || self.rompos >= 64 {
            return true;
        }
        let bit = self.rom.bit(self.rompos);
        match self.reads {
            0 => {
                self.reads = 1;
                bit
            }
            1 => {
                self.reads = 2;
                !bit
            }
            // A third read before the direction write: release the line.
            _ => true,
        }
    }

    /// Reacts to the master driving a bit: devices whose ROM disagrees drop out
    /// for the rest of the transaction, the others advance to the next bit.
    fn write(&mut self, bit: bool) {
        if !self.selected || self.rompos >= 64 {
            return;
        }
        if self.rom.bit(self.rompos) != bit {
            self.selected = false;
        } else {
            self.rompos += 1;
            self.reads = 0;
        }
    }
}

/// A simulated 1-Wire bus holding up to `N` devices.
///
/// Devices are attached with [with_device](SimBus::with_device) or
/// [with_alarmed_device](SimBus::with_alarmed_device); the bus then answers the
/// [OneWireBus] primitives the way a real multidrop segment would during a
/// search. [resets](SimBus::resets) counts reset pulses, which equals the
/// number of search transactions started.
#[derive(Debug)]
pub struct SimBus<const N: usize> {
    devices: [SimDevice; N],
    count: usize,
    resets: u32,
}

impl<const N: usize> Default for SimBus<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SimBus<N> {
    /// Creates a bus with no devices attached.
    pub fn new() -> Self {
        Self {
            devices: [SimDevice::new(RomCode::ZERO, false); N],
            count: 0,
            resets: 0,
        }
    }

    /// Attaches a device.
    ///
    /// # Panics
    /// Panics if the bus already holds `N` devices.
    pub fn with_device(self, rom: RomCode) -> Self {
        self.attach(SimDevice::new(rom, false))
    }

    /// Attaches a device that is in alarm state, so it also answers the
    /// conditional search command.
    ///
    /// # Panics
    /// Panics if the bus already holds `N` devices.
    pub fn with_alarmed_device(self, rom: RomCode) -> Self {
        self.attach(SimDevice::new(rom, true))
    }

    fn attach(mut self, device: SimDevice) -> Self {
        assert!(self.count < N, "simulated bus is full");
        self.devices[self.count] = device;
        self.count += 1;
        self
    }

    /// Number of devices attached to the bus.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the bus has no devices attached.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of reset pulses issued so far.
    pub fn resets(&self) -> u32 {
        self.resets
    }

    fn devices_mut(&mut self) -> &mut [SimDevice] {
        &mut self.devices[..self.count]
    }
}

impl<const N: usize> OneWireBus for SimBus<N> {
    type BusError = Infallible;

    fn reset(&mut self) -> Result<bool, Self::BusError> {
        self.resets += 1;
        for device in self.devices_mut() {
            device.rearm();
        }
        Ok(self.count > 0)
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), Self::BusError> {
        for device in self.devices_mut() {
            device.write(bit);
        }
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, Self::BusError> {
        let mut line = true;
        for device in self.devices_mut() {
            line &= device.read();
        }
        Ok(line)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::BusError> {
        // Command bytes are consumed whole; devices do not bit-match them. The
        // conditional search command drops non-alarmed devices out of the
        // transaction, every other command is ignored here.
        if byte == ONEWIRE_CONDITIONAL_SEARCH_CMD {
            for device in self.devices_mut() {
                if !device.alarmed {
                    device.selected = false;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_traffic_past_the_last_rom_bit_reads_as_released() {
        let rom = RomCode::from(0x5au64);
        let mut bus = SimBus::<1>::new().with_device(rom);
        bus.reset().unwrap();
        for index in 0..64u8 {
            let bit = bus.read_bit().unwrap();
            let complement = bus.read_bit().unwrap();
            assert_eq!(bit, rom.bit(index));
            assert_eq!(complement, !rom.bit(index));
            bus.write_bit(bit).unwrap();
        }
        // The device has walked its whole ROM; further slots must not be
        // answered, and writes must be ignored, until the next reset.
        assert!(bus.read_bit().unwrap());
        bus.write_bit(false).unwrap();
        assert!(bus.read_bit().unwrap());
        bus.reset().unwrap();
        assert_eq!(bus.read_bit().unwrap(), rom.bit(0));
    }
}
