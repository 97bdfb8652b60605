//! Guest that needs a host function, so it cannot be instantiated by a host
//! that provides no imports. Exercises the import section.
#![no_std]
#![no_main]

#[link(wasm_import_module = "env")]
extern "C" {
    fn host_log(value: i32);
}

#[no_mangle]
pub extern "C" fn report(value: i32) -> i32 {
    unsafe { host_log(value) };
    value
}

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    core::arch::wasm32::unreachable()
}
