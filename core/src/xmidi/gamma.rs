use std::ops::Index;

const MIN_GAMMA: f64 = 0.001;

/// Lookup table applying a gamma curve to `0..size` values.
#[derive(Debug, Clone, PartialEq)]
pub struct GammaTable {
  gamma: f64,
  table: Vec<u8>,
}

impl GammaTable {
  pub fn new(size: usize, gamma: f64) -> GammaTable {
    let mut table = GammaTable {
      gamma: 0.0,
      table: vec![0; size.max(2).min(256)],
    };
    table.set_gamma(gamma);
    table
  }

  pub fn gamma(&self) -> f64 {
    self.gamma
  }

  pub fn set_gamma(&mut self, gamma: f64) {
    let gamma = gamma.max(MIN_GAMMA);
    if (gamma - self.gamma).abs() < std::f64::EPSILON {
      return;
    }
    self.gamma = gamma;

    let top = (self.table.len() - 1) as f64;
    for (i, value) in self.table.iter_mut().enumerate() {
      *value = ((i as f64 / top).powf(1.0 / gamma) * top).round() as u8;
    }
  }

  pub fn len(&self) -> usize {
    self.table.len()
  }

  pub fn get(&self, index: u8) -> u8 {
    let last = self.table.len() - 1;
    self.table[(index as usize).min(last)]
  }
}

impl Index<u8> for GammaTable {
  type Output = u8;

  fn index(&self, index: u8) -> &u8 {
    let last = self.table.len() - 1;
    &self.table[(index as usize).min(last)]
  }
}
