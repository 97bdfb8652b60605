//! Guest with a long-running export next to `fibArray`, for interrupting a
//! call in flight and then reusing the same instance.

#[path = "../../kiln-guest/src/sequence.rs"]
mod sequence;

/// Never returns on its own.
#[no_mangle]
pub extern "C" fn spin(seed: i32) -> i32 {
    let mut state = seed;
    loop {
        state = core::hint::black_box(state.wrapping_mul(31).wrapping_add(7));
    }
}

#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn fibArray(n: i32) -> i32 {
    match sequence::fib_array(n) {
        Ok(term) => term,
        Err(_) => core::arch::wasm32::unreachable(),
    }
}
