use crate::{
    ONEWIRE_CONDITIONAL_SEARCH_CMD, ONEWIRE_SEARCH_CMD, OneWireBus, RomCode, rom::ROMCODE_BITS,
    utils::OneWireCrc,
};

/// Fork position sentinel meaning no fork has been taken yet.
const NO_PREVIOUS_FORK: u8 = ROMCODE_BITS;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Type of search performed using [`OneWireSearch`].
pub enum OneWireSearchKind {
    /// Normal search, enumerating every device on the bus
    Normal = ONEWIRE_SEARCH_CMD,
    /// Search only for devices in alarm state
    Alarmed = ONEWIRE_CONDITIONAL_SEARCH_CMD,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Status of a search session, read from [`OneWireSearch::status`] after each
/// [run](OneWireSearch::run).
pub enum SearchStatus {
    /// More devices may remain on the bus; call [run](OneWireSearch::run) again.
    More,
    /// Every device has been enumerated. Terminal.
    Done,
    /// The bus violated the search protocol: no presence pulse after reset, or a
    /// bit and its complement both read back as 1. Terminal.
    Failed,
}

/// The caller-owned state of one search session.
///
/// The search walks the implicit 64-level binary tree whose leaves are the
/// connected devices' ROM codes, one leaf per bus transaction, leftmost branch
/// first. Resuming only needs the code produced by the previous transaction and
/// the position of the last fork whose upper branch is still unexplored, so the
/// state is a few bytes regardless of how many devices are on the bus.
///
/// A session is driven by calling [run](OneWireSearch::run) with an output
/// buffer until [status](OneWireSearch::status) becomes terminal; the buffer may
/// be far smaller than the device population. No other bus traffic may be
/// interleaved between the runs of one session, since the devices' search state
/// is kept on the wire.
#[derive(Debug, Clone)]
pub struct OneWireSearch {
    cmd: u8,
    status: SearchStatus,
    first: bool,
    check_crc: bool,
    prev_fork: u8,
    prev_code: RomCode,
}

impl OneWireSearch {
    /// Creates a new [`OneWireSearch`] session.
    ///
    /// # Arguments
    /// * `kind` - The kind of search to perform (all devices, or alarmed only).
    pub fn new(kind: OneWireSearchKind) -> Self {
        Self::with_command(kind as _)
    }

    /// Creates a new [`OneWireSearch`] session with a raw command byte.
    /// The command is sent after every reset and selects the search semantics on
    /// the device side; it is opaque to the engine. Use this for device families
    /// with vendor-specific search commands.
    pub fn with_command(cmd: u8) -> Self {
        Self {
            cmd,
            status: SearchStatus::More,
            first: true,
            check_crc: false,
            prev_fork: NO_PREVIOUS_FORK,
            prev_code: RomCode::ZERO,
        }
    }

    /// Discard codes whose CRC byte does not match the rest of the code.
    /// Filtered codes are dropped from the output but the search still advances
    /// past them. Disabled by default.
    pub fn with_crc_check(mut self, check_crc: bool) -> Self {
        self.check_crc = check_crc;
        self
    }

    /// The current status of the session.
    pub fn status(&self) -> SearchStatus {
        self.status
    }

    /// Searches the bus for device ROM codes, resuming where the previous call
    /// left off.
    ///
    /// Performs bus transactions (reset, search command, 64 bit-pair exchanges)
    /// until `codes` is full or the search concludes, storing one discovered
    /// code per transaction. Codes are produced in discovery order, i.e.
    /// ascending in [`RomCode`]'s bit-transmission ordering, and each device
    /// appears exactly once per session. When the session is already terminal
    /// this returns 0 without touching the bus.
    ///
    /// # Arguments
    /// * `bus` - A mutable reference to a type implementing the [`OneWireBus`] trait.
    /// * `codes` - The output buffer; its length bounds how many transactions this call performs.
    ///
    /// # Returns
    /// A result containing the number of codes written into `codes`. Check
    /// [status](OneWireSearch::status) afterwards: [More](SearchStatus::More)
    /// means another call is needed, [Done](SearchStatus::Done) means the bus is
    /// exhausted, and [Failed](SearchStatus::Failed) means the bus violated the
    /// search protocol mid-session.
    ///
    /// # Errors
    /// This method returns an error if a transport operation fails. The session
    /// state is unspecified afterwards and should be dropped.
    pub fn run<T: OneWireBus>(
        &mut self,
        bus: &mut T,
        codes: &mut [RomCode],
    ) -> Result<usize, T::BusError> {
        if self.status != SearchStatus::More {
            return Ok(0);
        }

        let mut found = 0;

        'transactions: while found < codes.len() {
            let mut code = RomCode::ZERO;
            let mut last_fork = None;

            // Start a new transaction. Devices respond to reset.
            if !bus.reset()? {
                self.status = SearchStatus::Failed;
                break;
            }
            bus.write_byte(self.cmd)?;

            for index in 0..ROMCODE_BITS {
                // Read a bit and its complement. The bus is open-drain, so a
                // zero on either read means some device voted for that polarity.
                let bit = bus.read_bit()?;
                let complement = bus.read_bit()?;

                let resolved = match (bit, complement) {
                    (true, true) => {
                        // No device answered the bit request. Does not happen on
                        // a healthy bus once presence was seen.
                        self.status = SearchStatus::Failed;
                        break 'transactions;
                    }
                    (false, false) => {
                        // A fork: devices disagree at this position.
                        if (found > 0 || !self.first) && index < self.prev_fork {
                            // Earlier than the previous transaction's fork: take
                            // the same turn as before. A zero branch means the
                            // one branch is still unexplored, so remember it.
                            let replay = self.prev_code.bit(index);
                            if !replay {
                                last_fork = Some(index);
                            }
                            replay
                        } else if index == self.prev_fork {
                            // Both branches of the previous fork are now exhausted.
                            true
                        } else {
                            // A new fork: descend into the zero branch first.
                            last_fork = Some(index);
                            false
                        }
                    }
                    // All devices agree on this bit.
                    _ => bit,
                };

                // Writing the bit back deselects every device that disagrees
                // with it for the remainder of this transaction.
                bus.write_bit(resolved)?;
                code.set_bit(index, resolved);
            }

            // The previous code feeds fork replay, so it is recorded even when
            // the CRC filter drops the code from the output.
            self.prev_code = code;

            if !self.check_crc || OneWireCrc::validate(code.as_bytes()) {
                codes[found] = code;
                found += 1;
            }

            match last_fork {
                None => {
                    // No unexplored branch remains below the rightmost leaf.
                    self.status = SearchStatus::Done;
                    break;
                }
                Some(fork) => self.prev_fork = fork,
            }
        }

        self.first = false;
        Ok(found)
    }

    /// Verifies that the device with the given ROM code is currently present on
    /// the bus.
    ///
    /// Performs a single search transaction seeded to retrace `rom` at every
    /// fork, and checks that the bus reproduces the full code. With
    /// [Alarmed](OneWireSearchKind::Alarmed) this checks that the device is
    /// present and in alarm state. Uses a session of its own, so it must not be
    /// interleaved with the runs of another session.
    ///
    /// # Arguments
    /// * `bus` - A mutable reference to a type implementing the [`OneWireBus`] trait.
    /// * `kind` - The kind of search to verify against (all devices, or alarmed only).
    /// * `rom` - The ROM code to look for.
    ///
    /// # Errors
    /// This method returns an error if a transport operation fails.
    pub fn verify<T: OneWireBus>(
        bus: &mut T,
        kind: OneWireSearchKind,
        rom: RomCode,
    ) -> Result<bool, T::BusError> {
        let mut search = Self::new(kind);
        // With the fork sentinel in place and the first-transaction flag
        // cleared, every fork replays the target's bit.
        search.prev_code = rom;
        search.first = false;
        let mut found = [RomCode::ZERO];
        let count = search.run(bus, &mut found)?;
        Ok(count == 1 && found[0] == rom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    /// A bus whose every primitive panics. Proves code paths issue no traffic.
    struct UntouchableBus;

    impl OneWireBus for UntouchableBus {
        type BusError = Infallible;

        fn reset(&mut self) -> Result<bool, Self::BusError> {
            panic!("unexpected reset");
        }

        fn write_bit(&mut self, _bit: bool) -> Result<(), Self::BusError> {
            panic!("unexpected write");
        }

        fn read_bit(&mut self) -> Result<bool, Self::BusError> {
            panic!("unexpected read");
        }
    }

    /// A bus with nothing connected: reset never sees a presence pulse.
    struct EmptyBus {
        resets: usize,
    }

    impl OneWireBus for EmptyBus {
        type BusError = Infallible;

        fn reset(&mut self) -> Result<bool, Self::BusError> {
            self.resets += 1;
            Ok(false)
        }

        fn write_bit(&mut self, _bit: bool) -> Result<(), Self::BusError> {
            Ok(())
        }

        fn read_bit(&mut self) -> Result<bool, Self::BusError> {
            Ok(true)
        }
    }

    #[test]
    fn empty_output_buffer_performs_no_bus_activity() {
        let mut search = OneWireSearch::new(OneWireSearchKind::Normal);
        let count = search.run(&mut UntouchableBus, &mut []).unwrap();
        assert_eq!(count, 0);
        assert_eq!(search.status(), SearchStatus::More);
    }

    #[test]
    fn missing_presence_pulse_fails_the_session() {
        let mut bus = EmptyBus { resets: 0 };
        let mut search = OneWireSearch::new(OneWireSearchKind::Normal);
        let mut codes = [RomCode::ZERO; 4];
        let count = search.run(&mut bus, &mut codes).unwrap();
        assert_eq!(count, 0);
        assert_eq!(search.status(), SearchStatus::Failed);
        assert_eq!(bus.resets, 1);
    }

    #[test]
    fn terminal_session_ignores_further_runs() {
        let mut search = OneWireSearch::new(OneWireSearchKind::Normal);
        search.run(&mut EmptyBus { resets: 0 }, &mut [RomCode::ZERO]).unwrap();
        assert_eq!(search.status(), SearchStatus::Failed);
        // Terminal: no bus activity, no state change.
        let count = search.run(&mut UntouchableBus, &mut [RomCode::ZERO]).unwrap();
        assert_eq!(count, 0);
        assert_eq!(search.status(), SearchStatus::Failed);
    }
}
