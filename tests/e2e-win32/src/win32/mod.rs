//! Generated by bnd-win32; do not edit.

#![allow(non_snake_case)]

pub mod Devices_Properties;
pub mod Foundation;
pub mod System_Com;
pub mod UI_WindowsAndMessaging;
