mod win32;

#[cfg(all(test, target_pointer_width = "64"))]
mod tests {
    use std::cell::Cell;

    use crate::win32::Foundation::{E_FAIL, LARGE_INTEGER, POINT, RECT};
    use crate::win32::System_Com::{
        IBoundsProvider, IBoundsProvider_Vtbl, IID_IBoundsProvider, IPersist_Vtbl, IUnknown_Vtbl,
    };
    use crate::win32::UI_WindowsAndMessaging::{
        IDOK, MESSAGEBOX_RESULT, MSG, WC_STATICW, WINDOW_STYLE, WS_CHILD, WS_POPUP,
    };

    // -----------------------------------------------------------------------
    // An in-process object behind the generated IBoundsProvider handle.
    // IBoundsProvider -> IPersist -> IUnknown, so its table is
    // QueryInterface, AddRef, Release, GetClassID, GetBounds, IsDirty,
    // SetOrigin.
    // -----------------------------------------------------------------------

    #[repr(C)]
    struct Bounds {
        vtbl: *const IBoundsProvider_Vtbl,
        refs: Cell<u32>,
        dirty: Cell<usize>,
        origin: Cell<POINT>,
    }

    impl Bounds {
        fn new(vtbl: &IBoundsProvider_Vtbl) -> Self {
            Self {
                vtbl,
                refs: Cell::new(1),
                dirty: Cell::new(0),
                origin: Cell::new(POINT::default()),
            }
        }

        fn handle(&self) -> &IBoundsProvider {
            unsafe { &*(self as *const Bounds).cast::<IBoundsProvider>() }
        }
    }

    unsafe extern "system" fn add_ref(this: *const Bounds) -> u32 {
        let this = unsafe { &*this };
        this.refs.set(this.refs.get() + 1);
        this.refs.get()
    }

    unsafe extern "system" fn release(this: *const Bounds) -> u32 {
        let this = unsafe { &*this };
        this.refs.set(this.refs.get() - 1);
        this.refs.get()
    }

    unsafe extern "system" fn get_class_id(_this: *const Bounds, id: *mut bnd_rt::GUID) -> i32 {
        unsafe { id.write(IID_IBoundsProvider) };
        0
    }

    unsafe extern "system" fn get_bounds(this: *const Bounds, out: *mut RECT) -> *mut RECT {
        let origin = unsafe { (*this).origin.get() };
        let rect = RECT {
            left: origin.x,
            top: origin.y,
            right: origin.x + 640,
            bottom: origin.y + 480,
        };
        unsafe { out.write(rect) };
        out
    }

    unsafe extern "system" fn is_dirty(this: *const Bounds) -> usize {
        unsafe { (*this).dirty.get() }
    }

    unsafe extern "system" fn set_origin(this: *const Bounds, origin: usize) -> i32 {
        let origin: POINT = unsafe { bnd_rt::value_from_word(origin) };
        if origin.x < 0 {
            return E_FAIL;
        }
        let this = unsafe { &*this };
        this.origin.set(origin);
        this.dirty.set(1);
        0
    }

    fn vtbl() -> IBoundsProvider_Vtbl {
        IBoundsProvider_Vtbl {
            base__: IPersist_Vtbl {
                base__: IUnknown_Vtbl {
                    QueryInterface: 0,
                    AddRef: add_ref as usize,
                    Release: release as usize,
                },
                GetClassID: get_class_id as usize,
            },
            GetBounds: get_bounds as usize,
            IsDirty: is_dirty as usize,
            SetOrigin: set_origin as usize,
        }
    }

    #[test]
    fn inherited_methods_dispatch_through_base_slots() {
        let table = vtbl();
        let obj = Bounds::new(&table);
        let com = obj.handle();
        unsafe {
            assert_eq!(com.AddRef(), 2);
            assert_eq!(com.AddRef(), 3);
            assert_eq!(com.Release(), 2);

            let mut id = bnd_rt::GUID::default();
            assert_eq!(com.GetClassID(&mut id), 0);
            assert_eq!(id, IID_IBoundsProvider);
        }
    }

    #[test]
    fn small_aggregates_pass_by_value_and_large_ones_return_by_address() {
        let table = vtbl();
        let obj = Bounds::new(&table);
        let com = obj.handle();
        unsafe {
            assert_eq!(com.SetOrigin(POINT { x: 10, y: -20 }), 0);
            let r = com.GetBounds();
            assert_eq!((r.left, r.top, r.right, r.bottom), (10, -20, 650, 460));
        }
    }

    #[test]
    fn negative_hresults_survive_the_word_return() {
        let table = vtbl();
        let obj = Bounds::new(&table);
        unsafe {
            assert_eq!(obj.handle().SetOrigin(POINT { x: -1, y: 0 }), E_FAIL);
        }
        assert_eq!(obj.dirty.get(), 0);
    }

    #[test]
    fn bool_alias_returns_read_only_the_low_byte() {
        let table = vtbl();
        let obj = Bounds::new(&table);
        let com = obj.handle();
        for (word, expected) in [(0, false), (1, true), (0x100, false), (0xFF01, true)] {
            obj.dirty.set(word);
            assert_eq!(unsafe { com.IsDirty() }, expected, "word {word:#x}");
        }
    }

    // -----------------------------------------------------------------------
    // Types and constants
    // -----------------------------------------------------------------------

    #[test]
    fn string_pointer_constant_is_nul_terminated_utf16() {
        let units = unsafe { std::slice::from_raw_parts(WC_STATICW, 7) };
        assert_eq!(String::from_utf16(&units[..6]).unwrap(), "Static");
        assert_eq!(units[6], 0);
    }

    #[test]
    fn enums_are_newtypes_with_flag_operators() {
        let style: WINDOW_STYLE = WS_POPUP | WS_CHILD;
        assert_eq!(style.0, 0xC000_0000);
        assert_eq!((style & WS_CHILD), WS_CHILD);
        assert_eq!(IDOK, MESSAGEBOX_RESULT(1));
    }

    #[test]
    fn union_accessors_share_storage() {
        let mut li = LARGE_INTEGER::default();
        unsafe { *li.QuadPart() = -2 };
        assert_eq!(li.LowPart, 0xFFFF_FFFE);
        assert_eq!(li.HighPart, -1);
        assert_eq!(unsafe { li.QuadPart_val() }, -2);
        assert_eq!(std::mem::align_of::<LARGE_INTEGER>(), 8);
    }

    #[test]
    fn struct_layouts_match_the_target() {
        assert_eq!(std::mem::size_of::<MSG>(), 48);
        assert_eq!(std::mem::size_of::<IBoundsProvider>(), 8);
        assert_eq!(std::mem::size_of::<IBoundsProvider_Vtbl>(), 7 * 8);
    }

    #[cfg(windows)]
    #[test]
    fn free_functions_surface_last_error() {
        use crate::win32::Foundation::CloseHandle;
        // ERROR_INVALID_HANDLE
        let (ok, err) = unsafe { CloseHandle(0) };
        assert_eq!(ok, 0);
        assert_eq!(err, 6);
    }
}
