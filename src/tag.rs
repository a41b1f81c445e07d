//! # Block header/footer codec
//!
//! A block's boundary tags are packed machine words: the low bit carries the
//! allocated flag, the remaining bits carry the block's total size (always a
//! multiple of [`ALIGN`]). This module is the only place that casts raw
//! addresses to/from tag words, and the only place that derives a block's
//! neighbouring addresses from its payload pointer.

/// Size in bytes of a machine word (a pointer).
pub(crate) const WORD: usize = core::mem::size_of::<usize>();

/// Double-word alignment required of every block size and payload address.
pub(crate) const ALIGN: usize = 2 * WORD;

/// Smallest legal block size: header + prev + next + footer.
pub(crate) const MIN_BLOCK: usize = 4 * WORD;

const ALLOC_BIT: usize = 1;

/// Pack a `size` and `alloc` flag into a single tag word.
///
/// `size` must already be a multiple of [`ALIGN`]; the low bit is reserved
/// for the flag and is otherwise never set by a legal size.
#[inline]
pub(crate) const fn pack(size: usize, alloc: bool) -> usize {
    size | (alloc as usize)
}

#[inline]
const fn unpack_size(tag: usize) -> usize {
    tag & !(ALIGN - 1)
}

#[inline]
const fn unpack_alloc(tag: usize) -> bool {
    tag & ALLOC_BIT != 0
}

#[inline]
unsafe fn read_word(addr: *const u8) -> usize {
    unsafe { addr.cast::<usize>().read() }
}

#[inline]
unsafe fn write_word(addr: *mut u8, value: usize) {
    unsafe { addr.cast::<usize>().write(value) }
}

/// Address of `bp`'s header word.
#[inline]
pub(crate) unsafe fn header(bp: *mut u8) -> *mut u8 {
    unsafe { bp.sub(WORD) }
}

/// Total size (header + payload + footer) of the block at payload `bp`.
#[inline]
pub(crate) unsafe fn size_of_block(bp: *mut u8) -> usize {
    unsafe { unpack_size(read_word(header(bp))) }
}

/// Whether the block at payload `bp` is currently allocated.
#[inline]
pub(crate) unsafe fn is_allocated(bp: *mut u8) -> bool {
    unsafe { unpack_alloc(read_word(header(bp))) }
}

/// Address of `bp`'s footer word, given the block's (possibly not-yet-written) `size`.
#[inline]
pub(crate) unsafe fn footer_for(bp: *mut u8, size: usize) -> *mut u8 {
    unsafe { bp.add(size - 2 * WORD) }
}

/// Payload pointer of the block immediately following `bp`.
#[inline]
pub(crate) unsafe fn next_block(bp: *mut u8) -> *mut u8 {
    unsafe { bp.add(size_of_block(bp)) }
}

/// Payload pointer of the block immediately preceding `bp`, found via its footer.
#[inline]
pub(crate) unsafe fn prev_block(bp: *mut u8) -> *mut u8 {
    unsafe {
        let prev_footer = bp.sub(2 * WORD);
        let prev_size = unpack_size(read_word(prev_footer));
        bp.sub(prev_size)
    }
}

/// Write matching header and footer tags `(size, alloc)` for the block at `bp`.
///
/// Both ends are always written, even for allocated blocks: the footer of an
/// allocated block is never read at runtime by its owner, but the *next*
/// block relies on it to compute [`prev_block`] regardless of whether this
/// block is allocated or free.
#[inline]
pub(crate) unsafe fn set_tag(bp: *mut u8, size: usize, alloc: bool) {
    debug_assert_eq!(size % ALIGN, 0, "block size must be double-word aligned");
    unsafe {
        write_word(header(bp), pack(size, alloc));
        write_word(footer_for(bp, size), pack(size, alloc));
    }
}

/// Round `x` up to the nearest multiple of `m` (`m` a power of two).
#[inline]
pub(crate) const fn round_up(x: usize, m: usize) -> usize {
    (x + m - 1) & !(m - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_roundtrip() {
        let tag = pack(128, true);
        assert_eq!(unpack_size(tag), 128);
        assert!(unpack_alloc(tag));

        let tag = pack(256, false);
        assert_eq!(unpack_size(tag), 256);
        assert!(!unpack_alloc(tag));
    }

    #[test]
    fn round_up_to_align() {
        assert_eq!(round_up(1, ALIGN), ALIGN);
        assert_eq!(round_up(ALIGN, ALIGN), ALIGN);
        assert_eq!(round_up(ALIGN + 1, ALIGN), 2 * ALIGN);
    }

    #[test]
    fn header_footer_addresses() {
        // A fake payload address far enough from zero that subtraction is valid.
        let storage = [0u8; 64];
        let bp = unsafe { storage.as_ptr().add(WORD).cast_mut() };
        unsafe {
            set_tag(bp, 32, true);
            assert_eq!(size_of_block(bp), 32);
            assert!(is_allocated(bp));
            assert_eq!(next_block(bp), bp.add(32));
        }
    }
}
