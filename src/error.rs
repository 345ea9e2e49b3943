/// Error type for AS5047U operations
///
/// Only the transport can fail loudly. CRC and framing problems are reported
/// by the device through ERRFL and end up in the sticky error set; see
/// [`crate::As5047u::sticky_errors`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the sensor
    Communication(E),
}
