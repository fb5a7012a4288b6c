//! Size hints and size policies for widget layout negotiation.

use crate::geometry::Size;

/// How a widget behaves when offered more or less space than its hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SizePolicy {
    /// The widget cannot grow or shrink; it stays at its size hint.
    Fixed = 0,

    /// The size hint is the minimum size; the widget can grow.
    Minimum = 1,

    /// The size hint is the maximum size; the widget can shrink.
    Maximum = 2,

    /// The size hint is preferred but the widget can grow and shrink.
    #[default]
    Preferred = 3,

    /// The widget wants as much space as it can get.
    Expanding = 4,
}

impl SizePolicy {
    /// Returns true if the policy allows the widget to grow.
    #[inline]
    pub fn can_grow(self) -> bool {
        !matches!(self, Self::Fixed | Self::Maximum)
    }

    /// Returns true if the policy allows the widget to shrink.
    #[inline]
    pub fn can_shrink(self) -> bool {
        !matches!(self, Self::Fixed | Self::Minimum)
    }
}

/// Horizontal and vertical size policies together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePolicyPair {
    /// Horizontal size policy.
    pub horizontal: SizePolicy,
    /// Vertical size policy.
    pub vertical: SizePolicy,
}

impl SizePolicyPair {
    /// Create a new size policy pair.
    pub fn new(horizontal: SizePolicy, vertical: SizePolicy) -> Self {
        Self { horizontal, vertical }
    }

    /// Create a policy with the same value for both dimensions.
    pub fn uniform(policy: SizePolicy) -> Self {
        Self::new(policy, policy)
    }

    /// Swap horizontal and vertical.
    pub fn transposed(self) -> Self {
        Self {
            horizontal: self.vertical,
            vertical: self.horizontal,
        }
    }
}

/// Preferred, minimum and maximum sizes for a widget.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeHint {
    /// The preferred size.
    pub preferred: Size,
    /// The minimum acceptable size; `None` means the widget can shrink to
    /// nothing.
    pub minimum: Option<Size>,
    /// The maximum useful size; `None` means unbounded.
    pub maximum: Option<Size>,
}

impl SizeHint {
    /// Create a size hint with the given preferred size.
    pub fn new(preferred: Size) -> Self {
        Self {
            preferred,
            minimum: None,
            maximum: None,
        }
    }

    /// Create a size hint from explicit dimensions.
    pub fn from_dimensions(width: f32, height: f32) -> Self {
        Self::new(Size::new(width, height))
    }

    /// Create a fixed size hint (preferred = minimum = maximum).
    pub fn fixed(size: Size) -> Self {
        Self {
            preferred: size,
            minimum: Some(size),
            maximum: Some(size),
        }
    }

    /// Set the minimum size.
    pub fn with_minimum(mut self, minimum: Size) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Set the maximum size.
    pub fn with_maximum(mut self, maximum: Size) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// The minimum size, zero if unset.
    pub fn effective_minimum(&self) -> Size {
        self.minimum.unwrap_or(Size::ZERO)
    }

    /// The maximum size, effectively unbounded if unset.
    pub fn effective_maximum(&self) -> Size {
        self.maximum.unwrap_or(Size::new(f32::MAX, f32::MAX))
    }

    /// Clamp a size to the hint's bounds.
    pub fn constrain(&self, size: Size) -> Size {
        let min = self.effective_minimum();
        let max = self.effective_maximum();
        Size::new(
            size.width.clamp(min.width, max.width),
            size.height.clamp(min.height, max.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_grow_shrink() {
        assert!(!SizePolicy::Fixed.can_grow());
        assert!(!SizePolicy::Fixed.can_shrink());
        assert!(SizePolicy::Preferred.can_grow());
        assert!(SizePolicy::Preferred.can_shrink());
        assert!(!SizePolicy::Minimum.can_shrink());
        assert!(!SizePolicy::Maximum.can_grow());
    }

    #[test]
    fn test_hint_constrain() {
        let hint = SizeHint::new(Size::new(100.0, 30.0))
            .with_minimum(Size::new(50.0, 20.0))
            .with_maximum(Size::new(200.0, 40.0));

        assert_eq!(hint.constrain(Size::new(150.0, 30.0)), Size::new(150.0, 30.0));
        assert_eq!(hint.constrain(Size::new(10.0, 10.0)), Size::new(50.0, 20.0));
        assert_eq!(hint.constrain(Size::new(500.0, 100.0)), Size::new(200.0, 40.0));
    }

    #[test]
    fn test_fixed_hint() {
        let hint = SizeHint::fixed(Size::new(24.0, 24.0));
        assert_eq!(hint.minimum, Some(Size::new(24.0, 24.0)));
        assert_eq!(hint.maximum, Some(Size::new(24.0, 24.0)));
    }

    #[test]
    fn test_transposed() {
        let pair = SizePolicyPair::new(SizePolicy::Fixed, SizePolicy::Expanding).transposed();
        assert_eq!(pair.horizontal, SizePolicy::Expanding);
        assert_eq!(pair.vertical, SizePolicy::Fixed);
    }
}
