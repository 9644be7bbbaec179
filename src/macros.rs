use core::marker::PhantomData;

#[cfg(feature = "secure")]
macro_rules! s_ns {
    ($s:expr, $ns:expr $(,)?) => {
        $s
    };
}

#[cfg(feature = "nonsecure")]
macro_rules! s_ns {
    ($s:expr, $ns:expr $(,)?) => {
        $ns
    };
}

macro_rules! mask_u32 {
    ($mask:ident, $offset:ident, [$hi:tt : $lo:tt]) => {
        const $mask: u32 = 0xFFFF_FFFF >> (31 - ($hi - $lo));
        const $offset: u32 = $lo;
    };
}

/// Field mask already shifted into place, `[hi:lo]` as in the reference manual
macro_rules! msk_u32 {
    ([$hi:tt : $lo:tt]) => {
        (0xFFFF_FFFF_u32 >> (31 - ($hi - $lo))) << $lo
    };
}

macro_rules! set_u32 {
    ($reg:expr, $x:expr, $mask:expr, $offset:expr) => {
        $reg &= !($mask << $offset);
        $reg |= ($x & $mask) << $offset
    };
}

macro_rules! get_u32 {
    ($uxx:ty, $reg:expr, $mask:expr, $offset:expr) => {
        crate::macros::R::<$uxx>::r(($reg >> $offset) & $mask)
    };
}

/// Typed read view of a single SYS register
///
/// Every field type must implement `From` for its raw type, so field
/// decoding can't fail.
macro_rules! config_reg_u32 {
    ($ident_r:ident, $reg:expr, [$($field:ident => ($ty:ty, $ux:ty, [$hi:tt : $lo:tt], $doc:tt)),* $(,)?]) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub struct $ident_r(u32);

        impl $ident_r {
            #[allow(unused)]
            pub(crate) fn read_from(bus: &impl crate::regs::RegisterBus) -> Self {
                Self(bus.read($reg))
            }

            /// Raw register value
            pub fn bits(&self) -> u32 {
                self.0
            }

            $(
                #[doc=$doc]
                pub fn $field(&self) -> $ty {
                    mask_u32!(MASK, OFFSET, [$hi:$lo]);

                    let val = get_u32!($ux, self.0, MASK, OFFSET);

                    <$ty>::from(val)
                }
            )*
        }
    };
}

pub struct R<UXX> {
    _uxx: PhantomData<UXX>,
}

impl R<bool> {
    #[inline(always)]
    #[allow(unused)]
    pub fn r(val: u32) -> bool {
        val != 0
    }
}

impl R<u8> {
    #[inline(always)]
    #[allow(unused)]
    pub fn r(val: u32) -> u8 {
        val as u8
    }
}

impl R<u32> {
    #[inline(always)]
    #[allow(unused)]
    pub fn r(val: u32) -> u32 {
        val
    }
}

macro_rules! clear_status_reg_u32 {
    ($ident:ident, [
        $($field:ident => ($bit:tt, $doc:tt)),* $(,)?
    ]) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
        pub struct $ident(u32);

        impl $ident {
            pub fn new() -> Self {
                Self(0)
            }

            /// Mask accumulated so far
            pub fn bits(&self) -> u32 {
                self.0
            }

            $(
                #[doc=$doc]
                pub fn $field(&mut self) -> &mut Self {
                    mask_u32!(MASK, OFFSET, [$bit:$bit]);

                    set_u32!(self.0, 1, MASK, OFFSET);

                    self
                }
            )*
        }
    };
}
