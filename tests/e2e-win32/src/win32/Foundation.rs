//! `Foundation` bindings.
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

pub type HANDLE = usize;

pub type HWND = usize;

pub type BOOL = i32;

pub type BOOLEAN = bool;

pub type HRESULT = i32;

pub type LRESULT = usize;

pub type PWSTR = *mut u16;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct POINT {
    pub x: i32,
    pub y: i32,
}
impl Default for POINT {
    fn default() -> Self {
        unsafe { ::core::mem::zeroed() }
    }
}
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::size_of::<POINT>() == 8);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::align_of::<POINT>() == 4);

#[repr(C)]
#[derive(Clone, Copy)]
pub struct RECT {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}
impl Default for RECT {
    fn default() -> Self {
        unsafe { ::core::mem::zeroed() }
    }
}
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::size_of::<RECT>() == 16);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::align_of::<RECT>() == 4);

#[repr(C)]
#[derive(Clone, Copy)]
pub struct FILETIME_PAIR {
    pub created: i64,
    pub written: i64,
}
impl Default for FILETIME_PAIR {
    fn default() -> Self {
        unsafe { ::core::mem::zeroed() }
    }
}
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::size_of::<FILETIME_PAIR>() == 16);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::align_of::<FILETIME_PAIR>() == 8);

#[repr(C)]
#[derive(Clone, Copy)]
pub struct LARGE_INTEGER_Anonymous {
    pub LowPart: u32,
    pub HighPart: i32,
}
impl Default for LARGE_INTEGER_Anonymous {
    fn default() -> Self {
        unsafe { ::core::mem::zeroed() }
    }
}
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::size_of::<LARGE_INTEGER_Anonymous>() == 8);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::align_of::<LARGE_INTEGER_Anonymous>() == 4);

/// Union of 8 bytes.
#[repr(C, align(8))]
#[derive(Clone, Copy)]
pub struct LARGE_INTEGER {
    pub Anonymous: LARGE_INTEGER_Anonymous,
}
impl Default for LARGE_INTEGER {
    fn default() -> Self {
        unsafe { ::core::mem::zeroed() }
    }
}
impl ::core::ops::Deref for LARGE_INTEGER {
    type Target = LARGE_INTEGER_Anonymous;
    fn deref(&self) -> &LARGE_INTEGER_Anonymous {
        &self.Anonymous
    }
}
impl ::core::ops::DerefMut for LARGE_INTEGER {
    fn deref_mut(&mut self) -> &mut LARGE_INTEGER_Anonymous {
        &mut self.Anonymous
    }
}
impl LARGE_INTEGER {
    pub unsafe fn QuadPart(&mut self) -> &mut i64 {
        unsafe { &mut *(self as *mut Self).cast::<i64>() }
    }
    pub unsafe fn QuadPart_val(&self) -> i64 {
        unsafe { (self as *const Self).cast::<i64>().read_unaligned() }
    }
}
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::size_of::<LARGE_INTEGER>() == 8);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::align_of::<LARGE_INTEGER>() == 8);

pub const MAX_PATH: u32 = 260;
pub const WAIT_FAILED: u32 = 0xFFFFFFFF;
pub const INVALID_HANDLE_VALUE: HANDLE = 0xFFFFFFFFFFFFFFFF;
pub const E_FAIL: HRESULT = -2147467259;

pub unsafe fn CloseHandle(hObject: HANDLE) -> (BOOL, u32) {
    static __PROC: ::bnd_rt::LazyProc = ::bnd_rt::LazyProc::new(c"kernel32.dll", c"CloseHandle");
    unsafe {
        let __fn: unsafe extern "system" fn(usize) -> usize = ::core::mem::transmute(__PROC.address());
        let __ret = __fn(::core::mem::transmute::<HANDLE, usize>(hObject));
        let __err = ::bnd_rt::last_error();
        (__ret as i32, __err)
    }
}

pub unsafe fn Wow64EnableWow64FsRedirection(Wow64FsEnableRedirection: BOOLEAN) -> BOOLEAN {
    static __PROC: ::bnd_rt::LazyProc = ::bnd_rt::LazyProc::new(c"kernel32.dll", c"Wow64EnableWow64FsRedirection");
    unsafe {
        let __fn: unsafe extern "system" fn(usize) -> usize = ::core::mem::transmute(__PROC.address());
        let __ret = __fn(Wow64FsEnableRedirection as usize);
        __ret as u8 != 0
    }
}
