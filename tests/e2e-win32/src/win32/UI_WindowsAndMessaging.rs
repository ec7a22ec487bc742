//! `UI.WindowsAndMessaging` bindings.
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

#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct WINDOW_STYLE(pub u32);
pub const WS_OVERLAPPED: WINDOW_STYLE = WINDOW_STYLE(0);
pub const WS_POPUP: WINDOW_STYLE = WINDOW_STYLE(2147483648);
pub const WS_CHILD: WINDOW_STYLE = WINDOW_STYLE(1073741824);
impl ::core::ops::BitOr for WINDOW_STYLE {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
impl ::core::ops::BitOrAssign for WINDOW_STYLE {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
impl ::core::ops::BitAnd for WINDOW_STYLE {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}
impl ::core::ops::BitAndAssign for WINDOW_STYLE {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}
impl ::core::ops::Not for WINDOW_STYLE {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct MESSAGEBOX_STYLE(pub u32);
pub const MB_OK: MESSAGEBOX_STYLE = MESSAGEBOX_STYLE(0);
pub const MB_ICONHAND: MESSAGEBOX_STYLE = MESSAGEBOX_STYLE(16);
impl ::core::ops::BitOr for MESSAGEBOX_STYLE {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
impl ::core::ops::BitOrAssign for MESSAGEBOX_STYLE {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
impl ::core::ops::BitAnd for MESSAGEBOX_STYLE {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}
impl ::core::ops::BitAndAssign for MESSAGEBOX_STYLE {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}
impl ::core::ops::Not for MESSAGEBOX_STYLE {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct MESSAGEBOX_RESULT(pub i32);
pub const IDOK: MESSAGEBOX_RESULT = MESSAGEBOX_RESULT(1);
pub const IDCANCEL: MESSAGEBOX_RESULT = MESSAGEBOX_RESULT(2);

#[repr(C)]
#[derive(Clone, Copy)]
pub struct MSG {
    pub hwnd: super::Foundation::HWND,
    pub message: u32,
    pub wParam: usize,
    pub lParam: usize,
    pub time: u32,
    pub pt: super::Foundation::POINT,
}
impl Default for MSG {
    fn default() -> Self {
        unsafe { ::core::mem::zeroed() }
    }
}
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::size_of::<MSG>() == 48);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::align_of::<MSG>() == 8);

#[repr(C)]
#[derive(Clone, Copy)]
pub struct WNDCLASSEXW {
    pub cbSize: u32,
    pub lpfnWndProc: WNDPROC,
    pub hInstance: super::Foundation::HANDLE,
    pub lpszClassName: super::Foundation::PWSTR,
}
impl Default for WNDCLASSEXW {
    fn default() -> Self {
        unsafe { ::core::mem::zeroed() }
    }
}
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::size_of::<WNDCLASSEXW>() == 32);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::align_of::<WNDCLASSEXW>() == 8);

/// Union of 8 bytes.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct INPUT_Anonymous {
    pub ki: u64,
}
impl Default for INPUT_Anonymous {
    fn default() -> Self {
        unsafe { ::core::mem::zeroed() }
    }
}
impl ::core::ops::Deref for INPUT_Anonymous {
    type Target = u64;
    fn deref(&self) -> &u64 {
        &self.ki
    }
}
impl ::core::ops::DerefMut for INPUT_Anonymous {
    fn deref_mut(&mut self) -> &mut u64 {
        &mut self.ki
    }
}
impl INPUT_Anonymous {
    pub unsafe fn hi(&mut self) -> &mut u32 {
        unsafe { &mut *(self as *mut Self).cast::<u32>() }
    }
    pub unsafe fn hi_val(&self) -> u32 {
        unsafe { (self as *const Self).cast::<u32>().read_unaligned() }
    }
}
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::size_of::<INPUT_Anonymous>() == 8);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::align_of::<INPUT_Anonymous>() == 8);

#[repr(C)]
#[derive(Clone, Copy)]
pub struct INPUT {
    pub r#type: u32,
    pub Anonymous: INPUT_Anonymous,
}
impl Default for INPUT {
    fn default() -> Self {
        unsafe { ::core::mem::zeroed() }
    }
}
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::size_of::<INPUT>() == 16);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::align_of::<INPUT>() == 8);

#[repr(C)]
#[derive(Clone, Copy)]
pub struct TOUCH_SAMPLE {
    pub info: [u64; 18],
    pub keyboard: usize,
}
impl Default for TOUCH_SAMPLE {
    fn default() -> Self {
        unsafe { ::core::mem::zeroed() }
    }
}
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::size_of::<TOUCH_SAMPLE>() == 152);
#[cfg(target_pointer_width = "64")]
const _: () = assert!(::core::mem::align_of::<TOUCH_SAMPLE>() == 8);

pub type WNDPROC = Option<unsafe extern "system" fn(super::Foundation::HWND, u32, usize, usize) -> super::Foundation::LRESULT>;

pub const CW_USEDEFAULT: i32 = -2147483648;
pub const WS_TILED: WINDOW_STYLE = WINDOW_STYLE(0);

pub const WC_STATICW: super::Foundation::PWSTR = { const TEXT: &[u16] = &[83, 116, 97, 116, 105, 99, 0]; TEXT.as_ptr() as super::Foundation::PWSTR };

pub unsafe fn MessageBoxW(hWnd: super::Foundation::HWND, lpText: super::Foundation::PWSTR, lpCaption: super::Foundation::PWSTR, uType: MESSAGEBOX_STYLE) -> (MESSAGEBOX_RESULT, u32) {
    static __PROC: ::bnd_rt::LazyProc = ::bnd_rt::LazyProc::new(c"user32.dll", c"MessageBoxW");
    unsafe {
        let __fn: unsafe extern "system" fn(usize, usize, usize, usize) -> usize = ::core::mem::transmute(__PROC.address());
        let __ret = __fn(::core::mem::transmute::<super::Foundation::HWND, usize>(hWnd), lpText as usize, lpCaption as usize, uType.0 as usize);
        let __err = ::bnd_rt::last_error();
        (MESSAGEBOX_RESULT { 0: __ret as i32 }, __err)
    }
}

pub unsafe fn GetMessagePos() -> u32 {
    static __PROC: ::bnd_rt::LazyProc = ::bnd_rt::LazyProc::new(c"user32.dll", c"GetMessagePos");
    unsafe {
        let __fn: unsafe extern "system" fn() -> usize = ::core::mem::transmute(__PROC.address());
        let __ret = __fn();
        __ret as u32
    }
}

pub unsafe fn WindowFromPoint(Point: super::Foundation::POINT) -> super::Foundation::HWND {
    static __PROC: ::bnd_rt::LazyProc = ::bnd_rt::LazyProc::new(c"user32.dll", c"WindowFromPoint");
    unsafe {
        let __fn: unsafe extern "system" fn(usize) -> usize = ::core::mem::transmute(__PROC.address());
        let __ret = __fn(::bnd_rt::word_from_value(&Point));
        ::core::mem::transmute::<usize, super::Foundation::HWND>(__ret)
    }
}

pub unsafe fn GetClientRect(hWnd: super::Foundation::HWND, lpRect: *mut super::Foundation::RECT) -> (super::Foundation::BOOL, u32) {
    static __PROC: ::bnd_rt::LazyProc = ::bnd_rt::LazyProc::new(c"user32.dll", c"GetClientRect");
    unsafe {
        let __fn: unsafe extern "system" fn(usize, usize) -> usize = ::core::mem::transmute(__PROC.address());
        let __ret = __fn(::core::mem::transmute::<super::Foundation::HWND, usize>(hWnd), lpRect as usize);
        let __err = ::bnd_rt::last_error();
        (__ret as i32, __err)
    }
}

pub use self::MessageBoxW as MessageBox;

pub type WNDCLASSEX = WNDCLASSEXW;
