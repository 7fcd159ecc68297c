//! Easing: normalized time in, normalized time out.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Maps normalized time `[0, 1]` to eased normalized time.
pub trait EaseFunction {
    fn ease(&self, t: f32) -> f32;
}

impl<F> EaseFunction for F
where
    F: Fn(f32) -> f32,
{
    #[inline]
    fn ease(&self, t: f32) -> f32 {
        self(t)
    }
}

/// Built-in easing curves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Ease {
    #[default]
    Linear,
    InSine,
    OutSine,
    InOutSine,
    /// `t^p`
    InPow(f32),
    /// `1 - (1 - t)^p`
    OutPow(f32),
    InOutPow(f32),
    InBack,
    OutBack,
    InOutBack,
    InElastic,
    OutElastic,
    InOutElastic,
    InBounce,
    OutBounce,
    InOutBounce,
}

const BACK_C1: f32 = 1.70158;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;
const ELASTIC_C4: f32 = (2.0 * PI) / 3.0;
const ELASTIC_C5: f32 = (2.0 * PI) / 4.5;

impl Ease {
    pub const IN_QUAD: Ease = Ease::InPow(2.0);
    pub const OUT_QUAD: Ease = Ease::OutPow(2.0);
    pub const IN_OUT_QUAD: Ease = Ease::InOutPow(2.0);
    pub const IN_CUBIC: Ease = Ease::InPow(3.0);
    pub const OUT_CUBIC: Ease = Ease::OutPow(3.0);
    pub const IN_OUT_CUBIC: Ease = Ease::InOutPow(3.0);
    pub const IN_QUART: Ease = Ease::InPow(4.0);
    pub const OUT_QUART: Ease = Ease::OutPow(4.0);
    pub const IN_OUT_QUART: Ease = Ease::InOutPow(4.0);
    pub const IN_QUINT: Ease = Ease::InPow(5.0);
    pub const OUT_QUINT: Ease = Ease::OutPow(5.0);
    pub const IN_OUT_QUINT: Ease = Ease::InOutPow(5.0);
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

#[inline]
fn is_endpoint(t: f32) -> bool {
    t == 0.0 || (t - 1.0).abs() <= f32::EPSILON
}

impl EaseFunction for Ease {
    fn ease(&self, t: f32) -> f32 {
        match *self {
            Ease::Linear => t,
            Ease::InSine => 1.0 - ((t * PI) / 2.0).cos(),
            Ease::OutSine => ((t * PI) / 2.0).sin(),
            Ease::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Ease::InPow(p) => t.powf(p),
            Ease::OutPow(p) => 1.0 - (1.0 - t).powf(p),
            Ease::InOutPow(p) => {
                if t < 0.5 {
                    (2.0 * t).powf(p) / 2.0
                } else {
                    1.0 - (2.0 - 2.0 * t).powf(p) / 2.0
                }
            }
            Ease::InBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Ease::OutBack => {
                let t1 = t - 1.0;
                1.0 + BACK_C3 * t1 * t1 * t1 + BACK_C1 * t1 * t1
            }
            Ease::InOutBack => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2) + 2.0)
                        / 2.0
                }
            }
            Ease::InElastic => {
                if is_endpoint(t) {
                    return t;
                }
                -(2.0f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
            }
            Ease::OutElastic => {
                if is_endpoint(t) {
                    return t;
                }
                2.0f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
            }
            Ease::InOutElastic => {
                if is_endpoint(t) {
                    return t;
                }
                if t < 0.5 {
                    -(2.0f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        / 2.0
                } else {
                    (2.0f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        / 2.0
                        + 1.0
                }
            }
            Ease::InBounce => 1.0 - bounce_out(1.0 - t),
            Ease::OutBounce => bounce_out(t),
            Ease::InOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const ALL: [Ease; 16] = [
        Ease::Linear,
        Ease::InSine,
        Ease::OutSine,
        Ease::InOutSine,
        Ease::IN_QUAD,
        Ease::OUT_CUBIC,
        Ease::IN_OUT_QUART,
        Ease::InBack,
        Ease::OutBack,
        Ease::InOutBack,
        Ease::InElastic,
        Ease::OutElastic,
        Ease::InOutElastic,
        Ease::InBounce,
        Ease::OutBounce,
        Ease::InOutBounce,
    ];

    #[test]
    fn endpoints_are_fixed() {
        for ease in ALL {
            assert_abs_diff_eq!(ease.ease(0.0), 0.0, epsilon = 1e-4);
            assert_abs_diff_eq!(ease.ease(1.0), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn power_curves_bend_the_right_way() {
        assert!(Ease::IN_QUAD.ease(0.5) < 0.5);
        assert!(Ease::OUT_QUAD.ease(0.5) > 0.5);
        assert_abs_diff_eq!(Ease::IN_OUT_CUBIC.ease(0.5), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn closures_are_ease_functions() {
        let snap = |t: f32| if t < 1.0 { 0.0 } else { 1.0 };
        assert_eq!(snap.ease(0.7), 0.0);
        assert_eq!(snap.ease(1.0), 1.0);
    }
}
