//! `Devices.Properties` bindings.
//!
//! Generated by bnd-win32; do not edit.

#![allow(
    non_snake_case,
    non_camel_case_types,
    non_upper_case_globals,
    dead_code,
    overflowing_literals,
    clippy::all
)]

#[repr(C)]
#[derive(Clone, Copy)]
pub struct DEVPROPKEY {
    pub fmtid: ::bnd_rt::GUID,
    pub pid: u32,
}
impl Default for DEVPROPKEY {
    fn default() -> Self {
        unsafe { ::core::mem::zeroed() }
    }
}
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::size_of::<DEVPROPKEY>() == 20);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::align_of::<DEVPROPKEY>() == 4);

pub const DEVPKEY_Device_DeviceDesc: DEVPROPKEY = DEVPROPKEY { fmtid: ::bnd_rt::GUID::from_u128(0xa45c254edf1c4efd802067d146a850e0), pid: 2 };
