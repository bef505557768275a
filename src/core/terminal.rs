//! Terminal output trait.

/// Output side of a terminal: the progress display only writes and asks for width.
pub trait Terminal {
    /// Write output to the terminal.
    fn write(&mut self, data: &str);

    /// Push buffered output to the device.
    fn flush(&mut self) {}

    /// Reported column count, or `None` when the size cannot be queried.
    fn columns(&self) -> Option<u16>;
}

impl<T: Terminal + ?Sized> Terminal for Box<T> {
    fn write(&mut self, data: &str) {
        (**self).write(data);
    }

    fn flush(&mut self) {
        (**self).flush();
    }

    fn columns(&self) -> Option<u16> {
        (**self).columns()
    }
}
