use std::time::Duration;
use rand::Rng;

use crate::event::{Tone, Waveform};
use crate::script::Pitch;

const BASE_FREQUENCY: f32 = 200.0;
const LETTER_DURATION: Duration = Duration::from_millis(60);

const ALIEN_BASE_MULTIPLIER: f32 = 2.0;
const ALIEN_VARIATION: f32 = 0.15;
const ALIEN_DURATION: Duration = Duration::from_millis(40);
const ALIEN_HIGHPASS: f32 = 300.0;

/// Letter-by-letter babble synthesizer.
///
/// Produces tone descriptions only; playing them is up to the audio backend.
/// Tones are independent and may overlap.
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    pub enabled: bool,
    pub volume: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Self { enabled: true, volume: 1.0 }
    }
}

impl Voice {
    /// Tone for one revealed character, `None` for anything that is not an ASCII letter.
    pub fn tone<R: Rng>(&self, ch: char, loud: bool, pitch: Pitch, rng: &mut R) -> Option<Tone> {
        if !self.enabled || !ch.is_ascii_alphabetic() {
            return None;
        }
        let frequency = frequency_for(ch, loud, pitch, rng);
        let alien = pitch == Pitch::Alien;

        let volume = if loud {
            0.18
        } else if alien {
            0.14
        } else {
            0.08
        };

        Some(Tone {
            frequency,
            waveform: if alien { Waveform::Sawtooth } else { Waveform::Square },
            duration: if alien { ALIEN_DURATION } else { LETTER_DURATION },
            volume: volume * self.volume,
            highpass: alien.then_some(ALIEN_HIGHPASS),
        })
    }
}

fn frequency_for<R: Rng>(ch: char, loud: bool, pitch: Pitch, rng: &mut R) -> f32 {
    let multiplier = pitch.multiplier();
    let base = (if loud { BASE_FREQUENCY * 1.5 } else { BASE_FREQUENCY }) * multiplier;
    let position = (ch.to_ascii_lowercase() as u32 as f32 - 97.0) / 26.0;

    // flat and buzzy; ignores loudness on purpose
    if pitch == Pitch::Alien {
        let variation = position * 50.0 * ALIEN_VARIATION;
        return BASE_FREQUENCY * ALIEN_BASE_MULTIPLIER + variation + rng.random::<f32>() * 10.0;
    }

    if ch.is_ascii_lowercase() {
        let variation = position * 150.0 * multiplier;
        base + variation + (rng.random::<f32>() * 30.0 - 15.0)
    } else {
        base + rng.random::<f32>() * 50.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    #[test]
    fn silent_for_non_letters() {
        let voice = Voice::default();
        for ch in [' ', '.', '7', '*', 'é', '—'] {
            assert!(voice.tone(ch, false, Pitch::Normal, &mut rng()).is_none(), "{ch:?}");
        }
    }

    #[test]
    fn lowercase_frequency_tracks_alphabet_position() {
        let voice = Voice::default();
        let a = voice.tone('a', false, Pitch::Normal, &mut rng()).unwrap();
        let z = voice.tone('z', false, Pitch::Normal, &mut rng()).unwrap();
        assert!((185.0..=215.0).contains(&a.frequency), "{}", a.frequency);
        // 200 + 25/26*150 = 344.2, jitter +-15
        assert!((329.0..=360.0).contains(&z.frequency), "{}", z.frequency);
        assert_eq!(a.waveform, Waveform::Square);
        assert_eq!(a.duration, Duration::from_millis(60));
        assert_eq!(a.volume, 0.08);
    }

    #[test]
    fn loud_and_profiles_scale_the_base() {
        let voice = Voice::default();
        let loud = voice.tone('A', true, Pitch::High, &mut rng()).unwrap();
        // 200 * 1.5 * 1.8 = 540, plus up to 50 for uppercase
        assert!((540.0..=590.0).contains(&loud.frequency), "{}", loud.frequency);
        assert_eq!(loud.volume, 0.18);

        let low = voice.tone('A', false, Pitch::Low, &mut rng()).unwrap();
        assert!((140.0..=190.0).contains(&low.frequency), "{}", low.frequency);
    }

    #[test]
    fn alien_is_flat_buzzy_and_short() {
        let voice = Voice::default();
        let a = voice.tone('a', false, Pitch::Alien, &mut rng()).unwrap();
        let z = voice.tone('z', false, Pitch::Alien, &mut rng()).unwrap();
        assert!((400.0..=410.0).contains(&a.frequency));
        assert!((z.frequency - a.frequency).abs() < 20.0);
        assert_eq!(a.waveform, Waveform::Sawtooth);
        assert_eq!(a.duration, Duration::from_millis(40));
        assert_eq!(a.highpass, Some(300.0));
        assert_eq!(a.volume, 0.14);

        let shout = voice.tone('a', true, Pitch::Alien, &mut rng()).unwrap();
        assert_eq!(shout.volume, 0.18);
    }

    #[test]
    fn disabled_voice_is_mute() {
        let voice = Voice { enabled: false, volume: 1.0 };
        assert!(voice.tone('a', false, Pitch::Normal, &mut rng()).is_none());
    }
}
