//! Analysis demo: spectral, harmonic, cepstral and pitch features of a
//! synthetic harmonic tone.
//!
//! Run with: cargo run -p timbre-analysis --example analysis_demo

use std::f64::consts::PI;

use timbre_analysis::{
    Analyzer, FlatnessParams, HarmonicParams, LpccParams, MfccParams, Partials, PeakParams,
    RolloffParams, TristimulusOrder, TristimulusParams,
};

fn main() -> timbre_analysis::Result<()> {
    let sample_rate = 44100.0;
    let f0 = 220.0;

    // --- A tone with 1/h harmonic amplitudes ---
    let frame: Vec<f64> = (0..2048)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (1..=8)
                .map(|h| (2.0 * PI * f0 * h as f64 * t).sin() / h as f64)
                .sum()
        })
        .collect();

    let analyzer = Analyzer::new();

    println!("=== Spectrum ===\n");
    let spectrum = analyzer.spectrum(&frame, sample_rate)?;
    println!("  Bins:       {}", spectrum.len());
    println!("  Bin width:  {:.2} Hz", spectrum.bin_width());
    if let Some(bin) = spectrum.argmax() {
        println!("  Peak bin:   {} ({:.1} Hz)", bin, spectrum.frequency(bin));
    }

    let peaks = analyzer.peaks(&frame, sample_rate, &PeakParams::default())?;
    println!("  Peaks:      {}", peaks.count());
    for (freq, mag) in peaks.iter_partials().take(8) {
        println!("    {freq:>8.1} Hz  {mag:>8.2}");
    }

    println!("\n=== Scalar features ===\n");
    let flatness = analyzer.flatness(&frame, &FlatnessParams::default())?;
    println!("  Flatness:        {flatness:.4}");
    println!("  Tonality:        {:.4}", analyzer.tonality(&frame)?);
    println!(
        "  Rolloff (85%):   {:.1} Hz",
        analyzer.rolloff(&frame, sample_rate, &RolloffParams::default())?
    );
    println!("  ZCR:             {:.4}", analyzer.zero_crossing_rate(&frame));
    println!("  Loudness:        {:.3}", analyzer.loudness(&frame, sample_rate)?);

    println!("\n=== Harmonic features ===\n");
    for order in [TristimulusOrder::First, TristimulusOrder::Second, TristimulusOrder::Third] {
        let params = TristimulusParams::new(order).with_f0(f0);
        let value = analyzer.tristimulus(&frame, sample_rate, &params)?;
        println!("  Tristimulus {order:?}: {value:.4}");
    }
    let ratio = analyzer.odd_even_ratio(&frame, sample_rate, &HarmonicParams::new(f0))?;
    println!("  Odd/even ratio:  {ratio:.4}");

    println!("\n=== Cepstra ===\n");
    let mfcc = analyzer.mfcc(&frame, sample_rate, &MfccParams::default())?;
    println!("  MFCC[0..4]:  {:?}", &mfcc[..4]);
    let lpcc = analyzer.lpcc(&frame[..32], &LpccParams { order: Some(12) })?;
    println!("  LPCC[0..4]:  {:?}", &lpcc[..4]);

    println!("\n=== Pitch ===\n");
    println!("  AMDF f0:     {:.2} Hz", analyzer.f0(&frame, sample_rate)?);
    println!("  Wavelet f0:  {:.2} Hz", analyzer.wavelet_f0(&frame, sample_rate)?);

    let stats = analyzer.cache_stats();
    println!(
        "\nCache builds: {} plan(s), {} bark table(s), {} mel filterbank(s)",
        stats.plans, stats.bark, stats.mel
    );

    Ok(())
}
