//! bnd-rt: runtime support for bindings generated by `bnd-win32`.
//!
//! Generated modules call every export through a [`LazyProc`] slot, marshal
//! arguments to machine words with [`word_from_value`] / [`value_from_word`],
//! and surface the platform error code with [`last_error`].
//!
//! ```
//! use bnd_rt::{LazyProc, SymbolLoader};
//! use std::ffi::CStr;
//!
//! struct Fixed;
//! impl SymbolLoader for Fixed {
//!     fn load(&self, _library: &CStr, _symbol: &CStr) -> Option<usize> {
//!         Some(0x1000)
//!     }
//! }
//!
//! static SLOT: LazyProc = LazyProc::new(c"kernel32.dll", c"GetTickCount");
//! assert_eq!(SLOT.address_with(&Fixed), 0x1000);
//! ```

use std::ffi::CStr;
use std::mem::{MaybeUninit, size_of};
use std::sync::OnceLock;

/// Resolves an exported symbol of an import library to its address.
pub trait SymbolLoader {
    fn load(&self, library: &CStr, symbol: &CStr) -> Option<usize>;
}

/// The process loader: `LoadLibraryA` + `GetProcAddress` on Windows.
///
/// Other platforms have no import libraries to resolve against and always
/// report the symbol as missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLoader;

#[cfg(windows)]
mod sys {
    windows_link::link!("kernel32.dll" "system" fn LoadLibraryA(lplibfilename: *const std::ffi::c_char) -> isize);
    windows_link::link!("kernel32.dll" "system" fn GetProcAddress(hmodule: isize, lpprocname: *const std::ffi::c_char) -> usize);
    windows_link::link!("kernel32.dll" "system" fn GetLastError() -> u32);
}

impl SymbolLoader for SystemLoader {
    #[cfg(windows)]
    fn load(&self, library: &CStr, symbol: &CStr) -> Option<usize> {
        let module = unsafe { sys::LoadLibraryA(library.as_ptr()) };
        if module == 0 {
            return None;
        }
        match unsafe { sys::GetProcAddress(module, symbol.as_ptr()) } {
            0 => None,
            addr => Some(addr),
        }
    }

    #[cfg(not(windows))]
    fn load(&self, _library: &CStr, _symbol: &CStr) -> Option<usize> {
        None
    }
}

/// A process-wide, lazily resolved export address keyed by
/// (import library, exported symbol).
///
/// The first caller resolves the symbol; concurrent first callers block until
/// that resolution finishes, so the loader runs exactly once and every caller
/// observes the same fully resolved address.
#[derive(Debug)]
pub struct LazyProc {
    library: &'static CStr,
    symbol: &'static CStr,
    address: OnceLock<usize>,
}

impl LazyProc {
    pub const fn new(library: &'static CStr, symbol: &'static CStr) -> Self {
        Self {
            library,
            symbol,
            address: OnceLock::new(),
        }
    }

    /// Returns true once some caller has resolved the address.
    pub fn is_resolved(&self) -> bool {
        self.address.get().is_some()
    }

    /// Address of the export, resolved through the [`SystemLoader`].
    ///
    /// # Panics
    ///
    /// Panics if the library or symbol cannot be found. A binding whose
    /// export is missing cannot be called at all.
    pub fn address(&self) -> usize {
        self.address_with(&SystemLoader)
    }

    /// Address of the export, resolved through `loader` on first use.
    ///
    /// # Panics
    ///
    /// Panics if `loader` cannot resolve the symbol. The slot stays
    /// unresolved, so a later call retries.
    pub fn address_with(&self, loader: &impl SymbolLoader) -> usize {
        *self
            .address
            .get_or_init(|| match loader.load(self.library, self.symbol) {
                Some(addr) if addr != 0 => addr,
                _ => panic!(
                    "bnd-rt: failed to resolve `{}` in `{}`",
                    self.symbol.to_string_lossy(),
                    self.library.to_string_lossy()
                ),
            })
    }
}

/// The calling thread's last platform error code (`GetLastError` on Windows,
/// `errno` elsewhere).
#[cfg(windows)]
pub fn last_error() -> u32 {
    unsafe { sys::GetLastError() }
}

#[cfg(not(windows))]
pub fn last_error() -> u32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0) as u32
}

/// Reinterprets an aggregate that fits in a machine word as that word.
/// Bytes past `size_of::<T>()` are zero.
///
/// # Safety
///
/// Every byte of `value` must be initialized (no padding bytes).
pub unsafe fn word_from_value<T: Copy>(value: &T) -> usize {
    const { assert!(size_of::<T>() <= size_of::<usize>()) };
    let mut word = 0usize;
    unsafe {
        std::ptr::copy_nonoverlapping(
            value as *const T as *const u8,
            &mut word as *mut usize as *mut u8,
            size_of::<T>(),
        );
    }
    word
}

/// Reinterprets the low bytes of a machine word as a value of type `T`.
///
/// # Safety
///
/// The low `size_of::<T>()` bytes of `word` must be a valid `T`.
pub unsafe fn value_from_word<T: Copy>(word: usize) -> T {
    const { assert!(size_of::<T>() <= size_of::<usize>()) };
    let mut out = MaybeUninit::<T>::uninit();
    unsafe {
        std::ptr::copy_nonoverlapping(
            &word as *const usize as *const u8,
            out.as_mut_ptr() as *mut u8,
            size_of::<T>(),
        );
        out.assume_init()
    }
}

/// A COM-style 128-bit identity. 16 bytes, 4-byte aligned.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GUID {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl GUID {
    /// Builds a GUID from its canonical big-endian integer form, i.e.
    /// `6b29fc40-ca47-1067-b31d-00dd010662da` is `0x6b29fc40_ca47_1067_b31d_00dd010662da`.
    pub const fn from_u128(uuid: u128) -> Self {
        Self {
            data1: (uuid >> 96) as u32,
            data2: ((uuid >> 80) & 0xffff) as u16,
            data3: ((uuid >> 64) & 0xffff) as u16,
            data4: (uuid as u64).to_be_bytes(),
        }
    }

    pub const fn to_u128(&self) -> u128 {
        ((self.data1 as u128) << 96)
            | ((self.data2 as u128) << 80)
            | ((self.data3 as u128) << 64)
            | u64::from_be_bytes(self.data4) as u128
    }
}
