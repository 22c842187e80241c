pub(crate) mod serialport;
