//! ABI (Application Binary Interface) handling
//!
//! Register budgets are data, not branches: the marshaler classifies against
//! any `AbiParams` preset, and the dispatcher only accepts the host's.

/// Stack cleanup contract; argument order is the same for both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CallingConvention {
    /// Caller pops the arguments (platform default)
    #[default]
    Cdecl,
    /// Callee pops the arguments (Win32 API)
    Stdcall,
}

impl CallingConvention {
    /// Convention actually used on this target: only 32-bit Windows
    /// distinguishes the two
    #[inline]
    pub const fn effective(self) -> Self {
        if cfg!(all(target_arch = "x86", windows)) {
            self
        } else {
            Self::Cdecl
        }
    }
}

/// Argument layout family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiModel {
    /// Every argument is one or two 32-bit words on the stack
    Packed32,
    /// Integer and floating register files with a shared overflow area
    Registers,
}

/// Per-target classification parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbiParams {
    pub model: AbiModel,
    /// Integer argument registers
    pub int_regs: usize,
    /// Floating argument registers
    pub float_regs: usize,
    /// Argument N uses register slot N of whichever class it belongs to,
    /// consuming the other class's slot N as well
    pub paired: bool,
}

impl AbiParams {
    /// cdecl/stdcall on 32-bit x86
    pub const X86_32: Self = Self {
        model: AbiModel::Packed32,
        int_regs: 0,
        float_regs: 0,
        paired: false,
    };

    /// System V AMD64: RDI, RSI, RDX, RCX, R8, R9 and XMM0-XMM7
    pub const SYSV64: Self = Self {
        model: AbiModel::Registers,
        int_regs: 6,
        float_regs: 8,
        paired: false,
    };

    /// Microsoft x64: RCX/XMM0, RDX/XMM1, R8/XMM2, R9/XMM3 by position
    pub const WIN64: Self = Self {
        model: AbiModel::Registers,
        int_regs: 4,
        float_regs: 4,
        paired: true,
    };

    /// AAPCS64: X0-X7 and V0-V7
    pub const AARCH64: Self = Self {
        model: AbiModel::Registers,
        int_regs: 8,
        float_regs: 8,
        paired: false,
    };

    /// Preset for the compilation target, if the dispatcher supports it
    #[inline]
    pub const fn host() -> Option<Self> {
        #[cfg(target_arch = "x86")]
        return Some(Self::X86_32);

        #[cfg(all(target_arch = "x86_64", windows))]
        return Some(Self::WIN64);

        #[cfg(all(target_arch = "x86_64", not(windows)))]
        return Some(Self::SYSV64);

        #[cfg(target_arch = "aarch64")]
        return Some(Self::AARCH64);

        #[cfg(not(any(
            target_arch = "x86",
            target_arch = "x86_64",
            target_arch = "aarch64"
        )))]
        return None;
    }

    /// Width of one stack word in bytes
    #[inline]
    pub const fn word_size(self) -> usize {
        match self.model {
            AbiModel::Packed32 => 4,
            AbiModel::Registers => 8,
        }
    }
}

/// Where a classified argument landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    IntRegister(usize),
    FloatRegister(usize),
    Stack(usize),
}

/// Register/stack consumption for one call
///
/// Created per call and threaded through the marshaler; never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifierState {
    pub int_regs: usize,
    pub float_regs: usize,
    pub stack_words: usize,
}

impl ClassifierState {
    /// Fresh state for a new call
    #[inline]
    pub const fn new() -> Self {
        Self {
            int_regs: 0,
            float_regs: 0,
            stack_words: 0,
        }
    }

    /// Place the next integer-class argument
    pub fn next_int(&mut self, abi: &AbiParams) -> Placement {
        if abi.paired {
            return self.next_paired(abi, false);
        }
        if self.int_regs < abi.int_regs {
            self.int_regs += 1;
            Placement::IntRegister(self.int_regs - 1)
        } else {
            self.push_stack(1)
        }
    }

    /// Place the next floating-class argument
    pub fn next_float(&mut self, abi: &AbiParams) -> Placement {
        if abi.paired {
            return self.next_paired(abi, true);
        }
        if self.float_regs < abi.float_regs {
            self.float_regs += 1;
            Placement::FloatRegister(self.float_regs - 1)
        } else {
            self.push_stack(1)
        }
    }

    /// Reserve `words` consecutive stack words, returning the first
    #[inline]
    pub fn push_stack(&mut self, words: usize) -> Placement {
        let at = self.stack_words;
        self.stack_words += words;
        Placement::Stack(at)
    }

    fn next_paired(&mut self, abi: &AbiParams, is_float: bool) -> Placement {
        let position = self.int_regs.max(self.float_regs);
        // Every argument, register or not, advances both counters
        self.int_regs = position + 1;
        self.float_regs = position + 1;
        let budget = if is_float { abi.float_regs } else { abi.int_regs };
        match (position < budget, is_float) {
            (true, true) => Placement::FloatRegister(position),
            (true, false) => Placement::IntRegister(position),
            (false, _) => self.push_stack(1),
        }
    }

    /// Integer registers actually holding arguments
    #[inline]
    pub fn int_regs_used(&self, abi: &AbiParams) -> usize {
        self.int_regs.min(abi.int_regs)
    }

    /// Floating registers actually holding arguments
    #[inline]
    pub fn float_regs_used(&self, abi: &AbiParams) -> usize {
        self.float_regs.min(abi.float_regs)
    }
}
