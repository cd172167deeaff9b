use pal::InterruptControl;

/// Scoped interrupt mask.
///
/// Entering saves the interrupt flag and disables interrupts; dropping the
/// guard restores the saved flag, so nested sections and early returns leave
/// the flag exactly as they found it.
#[must_use = "interrupts are restored as soon as the guard is dropped"]
pub struct CriticalSection<'a, I: InterruptControl + ?Sized> {
    control: &'a I,
    were_enabled: bool,
}

impl<'a, I: InterruptControl + ?Sized> CriticalSection<'a, I> {
    pub fn enter(control: &'a I) -> Self {
        let were_enabled = control.interrupts_enabled();
        if were_enabled {
            control.disable_interrupts();
        }
        Self {
            control,
            were_enabled,
        }
    }
}

impl<'a, I: InterruptControl + ?Sized> Drop for CriticalSection<'a, I> {
    fn drop(&mut self) {
        if self.were_enabled {
            self.control.enable_interrupts();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPlatform;

    #[test]
    fn restores_enabled_flag_on_drop() {
        let platform = MockPlatform::new();
        platform.enable_interrupts();
        {
            let _guard = CriticalSection::enter(&platform);
            assert!(!platform.interrupts_enabled());
        }
        assert!(platform.interrupts_enabled());
    }

    #[test]
    fn nested_sections_keep_interrupts_masked_until_the_outermost_ends() {
        let platform = MockPlatform::new();
        platform.enable_interrupts();
        let outer = CriticalSection::enter(&platform);
        {
            let _inner = CriticalSection::enter(&platform);
        }
        assert!(!platform.interrupts_enabled());
        drop(outer);
        assert!(platform.interrupts_enabled());
    }

    #[test]
    fn leaves_disabled_flag_alone() {
        let platform = MockPlatform::new();
        {
            let _guard = CriticalSection::enter(&platform);
        }
        assert!(!platform.interrupts_enabled());
    }

    #[test]
    fn restores_on_early_error_return() {
        fn failing(platform: &MockPlatform) -> Result<(), ()> {
            let _guard = CriticalSection::enter(platform);
            Err(())?;
            Ok(())
        }
        let platform = MockPlatform::new();
        platform.enable_interrupts();
        assert!(failing(&platform).is_err());
        assert!(platform.interrupts_enabled());
    }
}
