/// Trait for the 1-Wire bus transport.
/// This trait defines the primitive operations the search engine drives: resetting
/// the bus, writing a command byte, and exchanging single bits. Implementations
/// wrap the actual electrical layer (a bridge chip, a bit-banged GPIO, a
/// simulator) and own its timing; every method blocks until the operation has
/// completed on the wire.
pub trait OneWireBus {
    /// The error type returned by the operations of this trait.
    /// This type is used to indicate errors in the underlying hardware or
    /// communication, not protocol-level conditions (those are reported through
    /// the search status).
    type BusError;

    /// Resets the 1-Wire bus.
    ///
    /// # Returns
    /// A result containing `true` if at least one device answered the reset
    /// pulse with a presence pulse.
    ///
    /// # Errors
    /// This method returns an error if the reset operation fails.
    fn reset(&mut self) -> Result<bool, Self::BusError>;

    /// Drives a single bit onto the 1-Wire bus.
    /// # Arguments
    /// * `bit` - The bit to write to the bus.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_bit(&mut self, bit: bool) -> Result<(), Self::BusError>;

    /// Samples a single bit from the 1-Wire bus.
    /// Because the bus is open-drain, a `false` result means at least one
    /// device is pulling the line low; `true` requires every device to have
    /// released it.
    ///
    /// # Returns
    /// The bit read from the bus.
    ///
    /// # Errors
    /// This method returns an error if the read operation fails.
    fn read_bit(&mut self) -> Result<bool, Self::BusError>;

    /// Writes a byte to the 1-Wire bus, least significant bit first.
    /// The provided implementation shifts the byte out through
    /// [write_bit](OneWireBus::write_bit); transports with a native byte
    /// primitive can override it.
    ///
    /// # Arguments
    /// * `byte` - The byte to write to the bus.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::BusError> {
        for shift in 0..8 {
            self.write_bit(byte & (1 << shift) != 0)?;
        }
        Ok(())
    }
}
