//! `System.Com` bindings.
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

pub const IID_IUnknown: ::bnd_rt::GUID = ::bnd_rt::GUID::from_u128(0x0000000000000000c000000000000046);

pub trait IUnknown_Impl {
    unsafe fn QueryInterface(&self, riid: *mut ::bnd_rt::GUID, ppvObject: *mut *mut ::core::ffi::c_void) -> super::Foundation::HRESULT;
    unsafe fn AddRef(&self) -> u32;
    unsafe fn Release(&self) -> u32;
}

/// Dispatch table: 3 slots, 0 inherited.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct IUnknown_Vtbl {
    pub QueryInterface: usize,
    pub AddRef: usize,
    pub Release: usize,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct IUnknown {
    pub lpVtbl: *const IUnknown_Vtbl,
}
impl IUnknown {
    pub unsafe fn QueryInterface(&self, riid: *mut ::bnd_rt::GUID, ppvObject: *mut *mut ::core::ffi::c_void) -> super::Foundation::HRESULT {
        unsafe {
            let __vtbl = *(self as *const Self).cast::<*const usize>();
            let __fn: unsafe extern "system" fn(usize, usize, usize) -> usize = ::core::mem::transmute(*__vtbl.add(0));
            let __ret = __fn(self as *const Self as usize, riid as usize, ppvObject as usize);
            __ret as i32
        }
    }
    pub unsafe fn AddRef(&self) -> u32 {
        unsafe {
            let __vtbl = *(self as *const Self).cast::<*const usize>();
            let __fn: unsafe extern "system" fn(usize) -> usize = ::core::mem::transmute(*__vtbl.add(1));
            let __ret = __fn(self as *const Self as usize);
            __ret as u32
        }
    }
    pub unsafe fn Release(&self) -> u32 {
        unsafe {
            let __vtbl = *(self as *const Self).cast::<*const usize>();
            let __fn: unsafe extern "system" fn(usize) -> usize = ::core::mem::transmute(*__vtbl.add(2));
            let __ret = __fn(self as *const Self as usize);
            __ret as u32
        }
    }
}

pub const IID_IPersist: ::bnd_rt::GUID = ::bnd_rt::GUID::from_u128(0x0000010c00000000c000000000000046);

pub trait IPersist_Impl: IUnknown_Impl {
    unsafe fn GetClassID(&self, pClassID: *mut ::bnd_rt::GUID) -> super::Foundation::HRESULT;
}

/// Dispatch table: 4 slots, 3 inherited.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct IPersist_Vtbl {
    pub base__: IUnknown_Vtbl,
    pub GetClassID: usize,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct IPersist {
    pub base__: IUnknown,
}
impl ::core::ops::Deref for IPersist {
    type Target = IUnknown;
    fn deref(&self) -> &IUnknown {
        &self.base__
    }
}
impl IPersist {
    pub unsafe fn GetClassID(&self, pClassID: *mut ::bnd_rt::GUID) -> super::Foundation::HRESULT {
        unsafe {
            let __vtbl = *(self as *const Self).cast::<*const usize>();
            let __fn: unsafe extern "system" fn(usize, usize) -> usize = ::core::mem::transmute(*__vtbl.add(3));
            let __ret = __fn(self as *const Self as usize, pClassID as usize);
            __ret as i32
        }
    }
}

pub const IID_IBoundsProvider: ::bnd_rt::GUID = ::bnd_rt::GUID::from_u128(0x5c8b7f4e1d2a4c3b9e6f0a1b2c3d4e5f);

pub trait IBoundsProvider_Impl: IPersist_Impl {
    unsafe fn GetBounds(&self) -> super::Foundation::RECT;
    unsafe fn IsDirty(&self) -> super::Foundation::BOOLEAN;
    unsafe fn SetOrigin(&self, origin: super::Foundation::POINT) -> super::Foundation::HRESULT;
}

/// Dispatch table: 7 slots, 4 inherited.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct IBoundsProvider_Vtbl {
    pub base__: IPersist_Vtbl,
    pub GetBounds: usize,
    pub IsDirty: usize,
    pub SetOrigin: usize,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct IBoundsProvider {
    pub base__: IPersist,
}
impl ::core::ops::Deref for IBoundsProvider {
    type Target = IPersist;
    fn deref(&self) -> &IPersist {
        &self.base__
    }
}
impl IBoundsProvider {
    pub unsafe fn GetBounds(&self) -> super::Foundation::RECT {
        unsafe {
            let mut __out = ::core::mem::MaybeUninit::<super::Foundation::RECT>::uninit();
            let __vtbl = *(self as *const Self).cast::<*const usize>();
            let __fn: unsafe extern "system" fn(usize, usize) -> usize = ::core::mem::transmute(*__vtbl.add(4));
            __fn(self as *const Self as usize, __out.as_mut_ptr() as usize);
            __out.assume_init()
        }
    }
    pub unsafe fn IsDirty(&self) -> super::Foundation::BOOLEAN {
        unsafe {
            let __vtbl = *(self as *const Self).cast::<*const usize>();
            let __fn: unsafe extern "system" fn(usize) -> usize = ::core::mem::transmute(*__vtbl.add(5));
            let __ret = __fn(self as *const Self as usize);
            __ret as u8 != 0
        }
    }
    pub unsafe fn SetOrigin(&self, origin: super::Foundation::POINT) -> super::Foundation::HRESULT {
        unsafe {
            let __vtbl = *(self as *const Self).cast::<*const usize>();
            let __fn: unsafe extern "system" fn(usize, usize) -> usize = ::core::mem::transmute(*__vtbl.add(6));
            let __ret = __fn(self as *const Self as usize, ::bnd_rt::word_from_value(&origin));
            __ret as i32
        }
    }
}

pub unsafe fn CoGetCurrentProcess() -> u32 {
    static __PROC: ::bnd_rt::LazyProc = ::bnd_rt::LazyProc::new(c"ole32.dll", c"CoGetCurrentProcess");
    unsafe {
        let __fn: unsafe extern "system" fn() -> usize = ::core::mem::transmute(__PROC.address());
        let __ret = __fn();
        __ret as u32
    }
}
