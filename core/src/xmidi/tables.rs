//! Instrument mapping tables between MT-32, General MIDI and Roland GS.
//!
//! Several MT-32 timbres have no real counterpart and are mapped to whatever
//! sounds closest. The values are kept as they are, existing content depends
//! on them.

/// MT-32 timbre to General MIDI program.
pub const MT32_AS_GM: [u8; 128] = [
  0,   // 0 Piano 1
  1,   // 1 Piano 2
  2,   // 2 Piano 3 (synth)
  4,   // 3 EPiano 1
  4,   // 4 EPiano 2
  5,   // 5 EPiano 3
  5,   // 6 EPiano 4
  3,   // 7 Honkytonk
  16,  // 8 Organ 1
  17,  // 9 Organ 2
  18,  // 10 Organ 3
  16,  // 11 Organ 4
  19,  // 12 Pipe Organ 1
  19,  // 13 Pipe Organ 2
  19,  // 14 Pipe Organ 3
  21,  // 15 Accordion
  6,   // 16 Harpsichord 1
  6,   // 17 Harpsichord 2
  6,   // 18 Harpsichord 3
  7,   // 19 Clavinet 1
  7,   // 20 Clavinet 2
  7,   // 21 Clavinet 3
  8,   // 22 Celesta 1
  8,   // 23 Celesta 2
  62,  // 24 Synthbrass 1
  63,  // 25 Synthbrass 2
  62,  // 26 Synthbrass 3
  63,  // 27 Synthbrass 4
  38,  // 28 Synthbass 1
  39,  // 29 Synthbass 2
  38,  // 30 Synthbass 3
  39,  // 31 Synthbass 4
  88,  // 32 Fantasy
  90,  // 33 Harmonic Pan, no equivalent, closest is Polysynth
  52,  // 34 Choral
  92,  // 35 Glass
  97,  // 36 Soundtrack
  99,  // 37 Atmosphere
  14,  // 38 Warmbell, Tubular Bells
  54,  // 39 FunnyVox
  98,  // 40 EchoBell, no real equivalent, sounds like Crystal
  96,  // 41 IceRain
  68,  // 42 Oboe 2001, plain Oboe
  95,  // 43 EchoPans, Sweep Pad
  81,  // 44 DoctorSolo
  87,  // 45 SchoolDaze, no real equivalent
  112, // 46 Bell Singer
  80,  // 47 SquareWave
  48,  // 48 Strings 1
  48,  // 49 Strings 2
  44,  // 50 Strings 3 (Synth), Tremolo Strings
  45,  // 51 Pizzicato Strings
  40,  // 52 Violin 1
  40,  // 53 Violin 2
  42,  // 54 Cello 1
  42,  // 55 Cello 2
  43,  // 56 Contrabass
  46,  // 57 Harp 1
  46,  // 58 Harp 2
  24,  // 59 Guitar 1 (Nylon)
  25,  // 60 Guitar 2 (Steel)
  26,  // 61 Elec Guitar 1
  27,  // 62 Elec Guitar 2
  104, // 63 Sitar
  32,  // 64 Acou Bass 1
  32,  // 65 Acou Bass 2
  33,  // 66 Elec Bass 1
  34,  // 67 Elec Bass 2
  36,  // 68 Slap Bass 1
  37,  // 69 Slap Bass 2
  35,  // 70 Fretless Bass 1
  35,  // 71 Fretless Bass 2
  73,  // 72 Flute 1
  73,  // 73 Flute 2
  72,  // 74 Piccolo 1
  72,  // 75 Piccolo 2
  74,  // 76 Recorder
  75,  // 77 Pan Pipes
  64,  // 78 Sax 1
  65,  // 79 Sax 2
  66,  // 80 Sax 3
  67,  // 81 Sax 4
  71,  // 82 Clarinet 1
  71,  // 83 Clarinet 2
  68,  // 84 Oboe
  69,  // 85 English Horn
  70,  // 86 Bassoon
  22,  // 87 Harmonica
  56,  // 88 Trumpet 1
  56,  // 89 Trumpet 2
  57,  // 90 Trombone 1
  57,  // 91 Trombone 2
  60,  // 92 French Horn 1
  60,  // 93 French Horn 2
  58,  // 94 Tuba
  61,  // 95 Brass 1
  61,  // 96 Brass 2
  11,  // 97 Vibes 1
  11,  // 98 Vibes 2
  99,  // 99 Syn Mallet
  112, // 100 WindBell, no real equivalent, Tinkle Bell
  9,   // 101 Glockenspiel
  14,  // 102 Tubular Bells
  13,  // 103 Xylophone
  12,  // 104 Marimba
  107, // 105 Koto
  111, // 106 Sho, Shanai
  77,  // 107 Shakauhachi
  78,  // 108 Whistle 1
  78,  // 109 Whistle 2
  76,  // 110 Bottle Blow
  76,  // 111 Breathpipe, no real equivalent, Bottle Blow
  47,  // 112 Timpani
  117, // 113 Melodic Tom
  116, // 114 Deep Snare, no equivalent, Taiko
  118, // 115 Electric Perc 1
  118, // 116 Electric Perc 2
  116, // 117 Taiko
  115, // 118 Taiko Rim, no real equivalent, Woodblock
  119, // 119 Cymbal, no real equivalent, Reverse Cymbal
  115, // 120 Castanets, no real equivalent, Woodblock
  112, // 121 Triangle, no real equivalent, Tinkle Bell
  55,  // 122 Orchestral Hit
  124, // 123 Telephone
  123, // 124 BirdTweet
  94,  // 125 Big Notes Pad, no equivalent, Halo Pad
  98,  // 126 Water Bell, Crystal Pad
  121, // 127 Jungle Tune, Breath Noise
];

/// MT-32 timbre to GS (program, bank) pairs.
pub const MT32_AS_GS: [u8; 256] = [
  0, 0, // 0 Piano 1
  1, 0, // 1 Piano 2
  2, 0, // 2 Piano 3 (synth)
  4, 0, // 3 EPiano 1
  4, 0, // 4 EPiano 2
  5, 0, // 5 EPiano 3
  5, 0, // 6 EPiano 4
  3, 0, // 7 Honkytonk
  16, 0, // 8 Organ 1
  17, 0, // 9 Organ 2
  18, 0, // 10 Organ 3
  16, 0, // 11 Organ 4
  19, 0, // 12 Pipe Organ 1
  19, 0, // 13 Pipe Organ 2
  19, 0, // 14 Pipe Organ 3
  21, 0, // 15 Accordion
  6, 0, // 16 Harpsichord 1
  6, 0, // 17 Harpsichord 2
  6, 0, // 18 Harpsichord 3
  7, 0, // 19 Clavinet 1
  7, 0, // 20 Clavinet 2
  7, 0, // 21 Clavinet 3
  8, 0, // 22 Celesta 1
  8, 0, // 23 Celesta 2
  62, 0, // 24 Synthbrass 1
  63, 0, // 25 Synthbrass 2
  62, 8, // 26 Synthbrass 3
  63, 8, // 27 Synthbrass 4
  38, 0, // 28 Synthbass 1
  39, 0, // 29 Synthbass 2
  38, 8, // 30 Synthbass 3
  39, 8, // 31 Synthbass 4
  88, 0, // 32 Fantasy
  90, 0, // 33 Harmonic Pan
  52, 0, // 34 Choral
  92, 0, // 35 Glass
  97, 0, // 36 Soundtrack
  99, 0, // 37 Atmosphere
  14, 0, // 38 Warmbell
  54, 0, // 39 FunnyVox
  98, 0, // 40 EchoBell
  96, 0, // 41 IceRain
  68, 0, // 42 Oboe 2001
  95, 0, // 43 EchoPans
  81, 8, // 44 DoctorSolo
  87, 0, // 45 SchoolDaze
  112, 0, // 46 Bell Singer
  80, 0, // 47 SquareWave
  48, 0, // 48 Strings 1
  49, 0, // 49 Strings 2
  50, 0, // 50 Strings 3 (Synth)
  45, 0, // 51 Pizzicato Strings
  40, 0, // 52 Violin 1
  41, 0, // 53 Violin 2
  42, 0, // 54 Cello 1
  42, 0, // 55 Cello 2
  43, 0, // 56 Contrabass
  46, 0, // 57 Harp 1
  46, 0, // 58 Harp 2
  24, 0, // 59 Guitar 1 (Nylon)
  25, 0, // 60 Guitar 2 (Steel)
  26, 0, // 61 Elec Guitar 1
  27, 0, // 62 Elec Guitar 2
  104, 0, // 63 Sitar
  32, 0, // 64 Acou Bass 1
  32, 0, // 65 Acou Bass 2
  33, 0, // 66 Elec Bass 1
  34, 0, // 67 Elec Bass 2
  36, 0, // 68 Slap Bass 1
  37, 0, // 69 Slap Bass 2
  35, 0, // 70 Fretless Bass 1
  35, 0, // 71 Fretless Bass 2
  73, 0, // 72 Flute 1
  73, 0, // 73 Flute 2
  72, 0, // 74 Piccolo 1
  72, 0, // 75 Piccolo 2
  74, 0, // 76 Recorder
  75, 0, // 77 Pan Pipes
  64, 0, // 78 Sax 1
  65, 0, // 79 Sax 2
  66, 0, // 80 Sax 3
  67, 0, // 81 Sax 4
  71, 0, // 82 Clarinet 1
  71, 0, // 83 Clarinet 2
  68, 0, // 84 Oboe
  69, 0, // 85 English Horn
  70, 0, // 86 Bassoon
  22, 0, // 87 Harmonica
  56, 0, // 88 Trumpet 1
  56, 0, // 89 Trumpet 2
  57, 0, // 90 Trombone 1
  57, 0, // 91 Trombone 2
  60, 0, // 92 French Horn 1
  60, 0, // 93 French Horn 2
  58, 0, // 94 Tuba
  61, 0, // 95 Brass 1
  61, 0, // 96 Brass 2
  11, 0, // 97 Vibes 1
  11, 0, // 98 Vibes 2
  99, 1, // 99 Syn Mallet
  112, 0, // 100 WindBell
  9, 0, // 101 Glockenspiel
  14, 0, // 102 Tubular Bells
  13, 0, // 103 Xylophone
  12, 0, // 104 Marimba
  107, 0, // 105 Koto
  111, 0, // 106 Sho
  77, 0, // 107 Shakauhachi
  78, 0, // 108 Whistle 1
  78, 0, // 109 Whistle 2
  76, 0, // 110 Bottle Blow
  76, 0, // 111 Breathpipe
  47, 0, // 112 Timpani
  117, 0, // 113 Melodic Tom
  116, 0, // 114 Deep Snare
  118, 0, // 115 Electric Perc 1
  118, 0, // 116 Electric Perc 2
  116, 0, // 117 Taiko
  115, 0, // 118 Taiko Rim
  119, 0, // 119 Cymbal
  115, 0, // 120 Castanets
  112, 0, // 121 Triangle
  55, 0, // 122 Orchestral Hit
  124, 0, // 123 Telephone
  123, 0, // 124 BirdTweet
  94, 0, // 125 Big Notes Pad
  98, 0, // 126 Water Bell
  121, 0, // 127 Jungle Tune
];

/// General MIDI program to MT-32 timbre.
pub const GM_AS_MT32: [u8; 128] = [
  0,   // 0 Acoustic Grand Piano
  1,   // 1 Bright Acoustic Piano
  2,   // 2 Electric Grand Piano
  7,   // 3 Honky-tonk Piano
  3,   // 4 Electric Piano 1
  5,   // 5 Electric Piano 2
  16,  // 6 Harpsichord
  19,  // 7 Clavinet
  22,  // 8 Celesta
  101, // 9 Glockenspiel
  101, // 10 Music Box
  97,  // 11 Vibraphone
  104, // 12 Marimba
  103, // 13 Xylophone
  102, // 14 Tubular Bells
  105, // 15 Dulcimer
  8,   // 16 Drawbar Organ
  9,   // 17 Percussive Organ
  10,  // 18 Rock Organ
  12,  // 19 Church Organ
  11,  // 20 Reed Organ
  15,  // 21 Accordion
  87,  // 22 Harmonica
  15,  // 23 Tango Accordion
  59,  // 24 Nylon Guitar
  60,  // 25 Steel Guitar
  61,  // 26 Jazz Guitar
  62,  // 27 Clean Guitar
  61,  // 28 Muted Guitar
  62,  // 29 Overdriven Guitar
  62,  // 30 Distortion Guitar
  62,  // 31 Guitar Harmonics
  64,  // 32 Acoustic Bass
  66,  // 33 Finger Bass
  67,  // 34 Pick Bass
  70,  // 35 Fretless Bass
  68,  // 36 Slap Bass 1
  69,  // 37 Slap Bass 2
  28,  // 38 Synth Bass 1
  29,  // 39 Synth Bass 2
  52,  // 40 Violin
  53,  // 41 Viola
  54,  // 42 Cello
  56,  // 43 Contrabass
  50,  // 44 Tremolo Strings
  51,  // 45 Pizzicato Strings
  57,  // 46 Harp
  112, // 47 Timpani
  48,  // 48 String Ensemble 1
  49,  // 49 String Ensemble 2
  50,  // 50 Synth Strings 1
  50,  // 51 Synth Strings 2
  34,  // 52 Choir Aahs
  34,  // 53 Voice Oohs
  34,  // 54 Synth Voice
  122, // 55 Orchestra Hit
  88,  // 56 Trumpet
  90,  // 57 Trombone
  94,  // 58 Tuba
  89,  // 59 Muted Trumpet
  92,  // 60 French Horn
  95,  // 61 Brass Section
  24,  // 62 Synth Brass 1
  25,  // 63 Synth Brass 2
  78,  // 64 Soprano Sax
  79,  // 65 Alto Sax
  80,  // 66 Tenor Sax
  81,  // 67 Baritone Sax
  84,  // 68 Oboe
  85,  // 69 English Horn
  86,  // 70 Bassoon
  82,  // 71 Clarinet
  74,  // 72 Piccolo
  72,  // 73 Flute
  76,  // 74 Recorder
  77,  // 75 Pan Flute
  110, // 76 Blown Bottle
  107, // 77 Shakuhachi
  108, // 78 Whistle
  76,  // 79 Ocarina
  47,  // 80 Square Lead
  44,  // 81 Saw Lead
  47,  // 82 Calliope Lead
  73,  // 83 Chiff Lead
  44,  // 84 Charang Lead
  34,  // 85 Voice Lead
  24,  // 86 Fifths Lead
  45,  // 87 Bass and Lead
  32,  // 88 New Age Pad
  37,  // 89 Warm Pad
  33,  // 90 Polysynth Pad
  34,  // 91 Choir Pad
  35,  // 92 Bowed Pad
  35,  // 93 Metallic Pad
  125, // 94 Halo Pad
  43,  // 95 Sweep Pad
  41,  // 96 Rain
  36,  // 97 Soundtrack
  40,  // 98 Crystal
  37,  // 99 Atmosphere
  35,  // 100 Brightness
  36,  // 101 Goblins
  43,  // 102 Echoes
  36,  // 103 Sci-fi
  63,  // 104 Sitar
  61,  // 105 Banjo
  105, // 106 Shamisen
  105, // 107 Koto
  104, // 108 Kalimba
  39,  // 109 Bagpipe
  52,  // 110 Fiddle
  106, // 111 Shanai
  121, // 112 Tinkle Bell
  116, // 113 Agogo
  99,  // 114 Steel Drums
  118, // 115 Woodblock
  117, // 116 Taiko Drum
  113, // 117 Melodic Tom
  115, // 118 Synth Drum
  119, // 119 Reverse Cymbal
  61,  // 120 Guitar Fret Noise
  111, // 121 Breath Noise
  36,  // 122 Seashore
  124, // 123 Bird Tweet
  123, // 124 Telephone Ring
  127, // 125 Helicopter
  36,  // 126 Applause
  119, // 127 Gunshot
];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tables_hold_valid_programs() {
    assert!(MT32_AS_GM.iter().all(|&p| p < 128));
    assert!(MT32_AS_GS.iter().all(|&p| p < 128));
    assert!(GM_AS_MT32.iter().all(|&p| p < 128));
  }

  #[test]
  fn gs_differs_from_gm_only_where_gs_has_the_sound() {
    let programs: Vec<(usize, u8)> = (0..128)
      .filter(|&p| MT32_AS_GS[p * 2] != MT32_AS_GM[p])
      .map(|p| (p, MT32_AS_GS[p * 2]))
      .collect();
    assert_eq!(programs, vec![(49, 49), (50, 50), (53, 41)]);

    let banks: Vec<(usize, u8)> = (0..128)
      .filter(|&p| MT32_AS_GS[p * 2 + 1] != 0)
      .map(|p| (p, MT32_AS_GS[p * 2 + 1]))
      .collect();
    assert_eq!(
      banks,
      vec![(26, 8), (27, 8), (30, 8), (31, 8), (44, 8), (99, 1)]
    );
  }

  #[test]
  fn unmatched_timbres_keep_their_substitutes() {
    assert_eq!(MT32_AS_GM[33], 90);
    assert_eq!(MT32_AS_GM[40], 98);
    assert_eq!(MT32_AS_GM[100], 112);
    assert_eq!(MT32_AS_GM[114], 116);
    assert_eq!(MT32_AS_GM[127], 121);
  }
}
