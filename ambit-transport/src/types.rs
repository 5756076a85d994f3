//! Common types for transport layer

/// One HID interface as reported by the bus enumeration
///
/// Wide strings are kept as raw code units (one `u32` per `wchar_t`), possibly
/// NUL terminated. They are decoded by [`crate::wide::wide_to_utf8`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInterface {
    /// Platform device path (hidraw node on Linux)
    pub path: String,
    /// USB Vendor ID
    pub vendor_id: u16,
    /// USB Product ID
    pub product_id: u16,
    /// Product string descriptor, if the bus reported one
    pub product: Option<Vec<u32>>,
    /// Serial number string descriptor, if the bus reported one
    pub serial: Option<Vec<u32>>,
}

impl RawInterface {
    /// Create a descriptor carrying only bus identity
    pub fn new(path: impl Into<String>, vendor_id: u16, product_id: u16) -> Self {
        Self {
            path: path.into(),
            vendor_id,
            product_id,
            product: None,
            serial: None,
        }
    }

    /// Attach a product string
    pub fn with_product(mut self, product: &str) -> Self {
        self.product = Some(crate::wide::widen(product));
        self
    }

    /// Attach a serial number string
    pub fn with_serial(mut self, serial: &str) -> Self {
        self.serial = Some(crate::wide::widen(serial));
        self
    }
}
