/// Fixed display palette for event chips
const PALETTE: [&str; 6] = [
    "#42a5f5", // blue
    "#ba68c8", // purple
    "#4fc3f7", // light blue
    "#e57373", // red
    "#81c784", // green
    "#ffb74d", // orange
];

/// FNV-1a, 64-bit
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Display color for an event, a pure function of its id.
///
/// The same event always renders the same color across re-renders; no
/// server-side color storage exists.
pub fn color_for_event(event_id: &str) -> &'static str {
    let index = (fnv1a(event_id.as_bytes()) % PALETTE.len() as u64) as usize;
    PALETTE[index]
}
