// src/engine.rs
// Simulated pulser/receiver. Stands in for the instrument link: it owns no
// gate state and only ships finished A-scans to the UI thread.
use std::f64::consts::PI;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::gates::{ChannelSettings, DisplayMode};
use crate::types::{EngineCommand, ScanFrame};
/// Points per A-scan regardless of range.
pub const POINTS_PER_SCAN: usize = 700;
const FRAME_INTERVAL: Duration = Duration::from_millis(20);
const IDLE_INTERVAL: Duration = Duration::from_millis(50);
#[derive(Clone, Copy, Debug)]
struct Echo {
    at_us: f64,
    amplitude: f64,
}
/// Water-coupled plate: interface echo, a small flaw and the back wall.
#[derive(Clone, Debug)]
pub struct Simulator {
    pub settings: ChannelSettings,
    pub water_path_us: f64,
    pub thickness_us: f64,
    /// Probe centre frequency in MHz (cycles per μs).
    pub frequency_mhz: f64,
    /// Interface detection threshold, percent of screen height.
    pub threshold: f64,
    pub noise: f64,
    rng: StdRng,
}
impl Simulator {
    pub fn new(settings: ChannelSettings, seed: u64) -> Self {
        Self {
            settings,
            water_path_us: 12.0,
            thickness_us: 18.0,
            frequency_mhz: 5.0,
            threshold: 20.0,
            noise: 1.5,
            rng: StdRng::seed_from_u64(seed),
        }
    }
    fn echoes(&mut self) -> [Echo; 3] {
        // part wobble under the probe
        let interface = self.water_path_us + self.rng.gen_range(-0.4..0.4);
        [
            Echo {
                at_us: interface,
                amplitude: 80.0,
            },
            Echo {
                at_us: interface + self.thickness_us * 0.55,
                amplitude: 25.0,
            },
            Echo {
                at_us: interface + self.thickness_us,
                amplitude: 45.0,
            },
        ]
    }
    fn signal(&self, echoes: &[Echo], t: f64) -> f64 {
        echoes
            .iter()
            .map(|e| {
                let dt = t - e.at_us;
                let envelope = (-(dt / 0.25).powi(2)).exp();
                e.amplitude * envelope * (2.0 * PI * self.frequency_mhz * dt).cos()
            })
            .sum()
    }
    fn rectify(mode: DisplayMode, v: f64) -> f64 {
        match mode {
            DisplayMode::PositiveHalf => v.max(0.0),
            DisplayMode::NegativeHalf => (-v).max(0.0),
            DisplayMode::FullWave => v.abs(),
            // half scale each way around the centre line
            DisplayMode::Rf => v / 2.0,
            DisplayMode::Off => 0.0,
        }
    }
    /// First digitizer sample, counted from the initial pulse, where the
    /// interface echo exceeds the threshold.
    fn crossing_sample(&self, echoes: &[Echo]) -> Option<u32> {
        let step = self.settings.us_per_sample;
        if step <= 0.0 {
            return None;
        }
        let interface = echoes.first()?;
        let last = ((interface.at_us + 1.0) / step) as u32;
        (0..=last).find(|&k| self.signal(&echoes[..1], k as f64 * step).abs() >= self.threshold)
    }
    pub fn frame(&mut self) -> ScanFrame {
        let echoes = self.echoes();
        let settings = self.settings;
        let us_per_point = settings.range_us / POINTS_PER_SCAN as f64;
        let samples = (0..POINTS_PER_SCAN)
            .map(|i| {
                let t = settings.delay_us + i as f64 * us_per_point;
                let noise = self.rng.gen_range(-self.noise..=self.noise);
                Self::rectify(settings.mode, self.signal(&echoes, t) + noise)
            })
            .collect();
        ScanFrame {
            samples,
            us_per_point,
            crossing_sample: self.crossing_sample(&echoes),
        }
    }
}
pub fn spawn_thread(tx: Sender<ScanFrame>, rx_cmd: Receiver<EngineCommand>) -> JoinHandle<()> {
    thread::spawn(move || {
        info!("simulator thread ready");
        let mut sim = Simulator::new(ChannelSettings::default(), rand::random());
        let mut running = false;
        loop {
            loop {
                match rx_cmd.try_recv() {
                    Ok(EngineCommand::Start) => {
                        running = true;
                        debug!("simulator started");
                    }
                    Ok(EngineCommand::Stop) => {
                        running = false;
                        debug!("simulator stopped");
                    }
                    Ok(EngineCommand::Configure(settings)) => sim.settings = settings,
                    Ok(EngineCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                        info!("simulator thread exiting");
                        return;
                    }
                    Err(TryRecvError::Empty) => break,
                }
            }
            if running {
                if tx.send(sim.frame()).is_err() {
                    warn!("frame receiver dropped, stopping simulator");
                    return;
                }
                thread::sleep(FRAME_INTERVAL);
            } else {
                thread::sleep(IDLE_INTERVAL);
            }
        }
    })
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    fn sim(mode: DisplayMode) -> Simulator {
        Simulator::new(
            ChannelSettings {
                mode,
                ..ChannelSettings::default()
            },
            7,
        )
    }
    #[test]
    fn frame_spans_the_range() {
        let frame = sim(DisplayMode::FullWave).frame();
        assert_eq!(frame.samples.len(), POINTS_PER_SCAN);
        let covered = frame.us_per_point * frame.samples.len() as f64;
        assert!((covered - 100.0).abs() < 1e-9);
    }
    #[test]
    fn rectification_follows_mode() {
        assert!(sim(DisplayMode::PositiveHalf).frame().samples.iter().all(|v| *v >= 0.0));
        assert!(sim(DisplayMode::NegativeHalf).frame().samples.iter().all(|v| *v >= 0.0));
        assert!(sim(DisplayMode::Off).frame().samples.iter().all(|v| *v == 0.0));
        let rf = sim(DisplayMode::Rf).frame();
        assert!(rf.samples.iter().any(|v| *v < 0.0));
        assert!(rf.samples.iter().all(|v| v.abs() <= 80.0));
    }
    #[test]
    fn crossing_sits_on_interface_echo() {
        let mut s = sim(DisplayMode::FullWave);
        for _ in 0..20 {
            let frame = s.frame();
            let sample = frame.crossing_sample.unwrap();
            let us = sample as f64 * 0.015;
            assert!(us > 11.0 && us < 12.5, "crossing at {us} us");
        }
    }
    #[test]
    fn no_crossing_without_sample_period() {
        let mut s = sim(DisplayMode::FullWave);
        s.settings.us_per_sample = 0.0;
        assert_eq!(s.frame().crossing_sample, None);
    }
    #[test]
    fn thread_streams_until_shutdown() {
        let (tx_frame, rx_frame) = mpsc::channel();
        let (tx_cmd, rx_cmd) = mpsc::channel();
        let handle = spawn_thread(tx_frame, rx_cmd);
        tx_cmd.send(EngineCommand::Start).unwrap();
        let frame = rx_frame.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(frame.samples.len(), POINTS_PER_SCAN);
        tx_cmd.send(EngineCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }
}
